use chrono::{DateTime, Utc};
use fs_err as fs;
use serde::Serialize;
use serde_json::to_string_pretty;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::workflow::Checkpoint;

/// Directory holding every artifact produced by one wizard run.
#[derive(Debug, Clone)]
pub struct Run {
    pub id: Uuid,
    pub dir: PathBuf,
}

#[derive(Serialize)]
struct RunInfo<'a> {
    id: Uuid,
    started_at: DateTime<Utc>,
    provider: &'a str,
    model: &'a str,
}

fn run_dir(root: &Path, id: Uuid) -> PathBuf {
    root.join(id.to_string())
}

pub fn start_run(root: &Path, provider: &str, model: &str) -> anyhow::Result<Run> {
    let id = Uuid::new_v4();
    let dir = run_dir(root, id);
    fs::create_dir_all(&dir)?;

    let info = RunInfo { id, started_at: Utc::now(), provider, model };
    fs::write(dir.join("run.json"), to_string_pretty(&info)?)?;
    Ok(Run { id, dir })
}

fn artifact_name(checkpoint: &Checkpoint) -> &'static str {
    match checkpoint {
        Checkpoint::Project(_) => "project",
        Checkpoint::Analysis(_) => "analysis",
        Checkpoint::Design(_) => "design",
        Checkpoint::Visual(_) => "visual",
    }
}

/// Write the checkpoint entity as pretty JSON, replacing any earlier version.
pub fn save_checkpoint(run: &Run, checkpoint: &Checkpoint) -> anyhow::Result<PathBuf> {
    let json = match checkpoint {
        Checkpoint::Project(v) => to_string_pretty(v)?,
        Checkpoint::Analysis(v) => to_string_pretty(v)?,
        Checkpoint::Design(v) => to_string_pretty(v)?,
        Checkpoint::Visual(v) => to_string_pretty(v)?,
    };
    let path = run.dir.join(format!("{}.json", artifact_name(checkpoint)));
    fs::write(&path, json)?;
    Ok(path)
}

pub fn print_saved_path(path: &Path) {
    println!("debug: artifact saved at: {}", path.display());
    std::io::stdout().flush().ok();
}
