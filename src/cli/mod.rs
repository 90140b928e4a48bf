use clap::Parser;

use design_architect::config::{Config, ProviderKind};

#[derive(Parser, Debug)]
#[command(name = "design_architect", version, about = "Idea → analysis → interaction design → Nano Pro visual prompts")]
pub struct Args {
    /// TOML config file; flags below override it.
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub api_base: Option<String>,

    /// Env var that holds the API key.
    #[arg(long)]
    pub api_key_env: Option<String>,

    /// Free-text idea to parse instead of prompting for one.
    #[arg(long, conflicts_with = "skip_idea")]
    pub idea: Option<String>,

    /// Start from an empty project form.
    #[arg(long, default_value_t = false)]
    pub skip_idea: bool,

    /// Accept every checkpoint without prompting.
    #[arg(long, short = 'y', default_value_t = false)]
    pub yes: bool,

    #[arg(long, default_value_t = false)]
    pub no_save: bool,

    #[arg(long)]
    pub artifacts_dir: Option<String>,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    /// Flags win over the file.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(p) = self.provider {
            cfg.provider = p;
        }
        if let Some(m) = &self.model {
            cfg.model = Some(m.clone());
        }
        if let Some(b) = &self.api_base {
            cfg.api_base = Some(b.clone());
        }
        if let Some(k) = &self.api_key_env {
            cfg.api_key_env = Some(k.clone());
        }
        if let Some(d) = &self.artifacts_dir {
            cfg.artifacts_dir = d.clone();
        }
        if self.no_save {
            cfg.save_artifacts = false;
        }
        if self.yes {
            cfg.auto_approve = true;
        }
    }
}
