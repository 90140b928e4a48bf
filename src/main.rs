use anyhow::bail;
use clap::Parser;
use std::path::Path;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use design_architect::config::Config;
use design_architect::log::{self, Run};
use design_architect::provider::make_provider;
use design_architect::wire::DesignStage;
use design_architect::{Event, GenerationClient, Step, Workflow};

mod cli;
mod ux;

const RESET_WARNING: &str = "返回首页将丢失当前所有进度，确定吗？";

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry().with(fmt::layer().with_target(false)).with(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_tracing(args.debug);

    let mut cfg = match &args.config {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };
    args.apply(&mut cfg);

    let model = cfg.model();
    let provider = match make_provider(&cfg) {
        Ok(p) => p,
        Err(e) => {
            ux::show_fatal(&e);
            return Err(e.into());
        }
    };
    let client = GenerationClient::new(provider);

    let run = if cfg.save_artifacts {
        let run = log::start_run(Path::new(&cfg.artifacts_dir), client.provider_name(), &model)?;
        if args.debug {
            println!("debug: run {} at {}", run.id, run.dir.display());
        }
        Some(run)
    } else {
        None
    };

    let mut wf = Workflow::new();
    let mut idea = args.idea.clone();
    if args.skip_idea {
        wf.begin(Event::Skip)?;
    }

    loop {
        if let Some(failure) = wf.failure() {
            ux::show_failure(failure);
            if failure.is_fatal() || cfg.auto_approve {
                bail!("{}", failure.cause);
            }
        }

        let event = match next_event(&wf, &cfg, &mut idea)? {
            Some(e) => e,
            None => break,
        };

        let pending = match wf.begin(event) {
            Ok(p) => p,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        let Some(pending) = pending else { continue };

        let spinner = ux::spinner(wf.step());
        let outcome = pending.run(&client).await;
        spinner.finish_and_clear();
        wf.complete(outcome)?;

        if wf.failure().is_none() {
            save(run.as_ref(), &wf, args.debug)?;
        }
    }

    println!("Bye.");
    Ok(())
}

fn save(run: Option<&Run>, wf: &Workflow, debug: bool) -> anyhow::Result<()> {
    let (Some(run), Some(checkpoint)) = (run, wf.checkpoint()) else {
        return Ok(());
    };
    let path = log::save_checkpoint(run, &checkpoint)?;
    if debug {
        log::print_saved_path(&path);
    }
    Ok(())
}

/// Ask the user what to do at a resting step. `None` means quit.
fn next_event(wf: &Workflow, cfg: &Config, idea: &mut Option<String>) -> anyhow::Result<Option<Event>> {
    let step = wf.step();
    ux::show_header(step);

    match step {
        Step::Idea => {
            let text = match idea.take() {
                Some(t) => t,
                None if cfg.auto_approve => String::new(),
                None => match ux::ask("Describe your product idea (empty to fill the form by hand)") {
                    Some(t) => t,
                    None => return Ok(None),
                },
            };
            if text.trim().is_empty() {
                Ok(Some(Event::Skip))
            } else {
                Ok(Some(Event::SubmitIdea(text)))
            }
        }
        Step::Input => {
            let project = wf.project().clone();
            ux::show_checkpoint(&design_architect::Checkpoint::Project(project.clone()));
            if cfg.auto_approve {
                return Ok(Some(Event::SubmitProject(project)));
            }
            loop {
                match ux::choose("Project", &[('s', "ubmit"), ('e', "dit"), ('r', "eset"), ('q', "uit")]) {
                    's' => return Ok(Some(Event::SubmitProject(project))),
                    'e' => match ux::edit_json(&project) {
                        Ok(edited) => return Ok(Some(Event::SubmitProject(edited))),
                        Err(e) => println!("{e:#}"),
                    },
                    'r' => {
                        if let Some(ev) = reset() {
                            return Ok(Some(ev));
                        }
                    }
                    _ => return Ok(None),
                }
            }
        }
        Step::Adjustment => {
            let Some(analysis) = wf.analysis().cloned() else { bail!("analysis missing at review step") };
            ux::show_checkpoint(&design_architect::Checkpoint::Analysis(analysis.clone()));
            if cfg.auto_approve {
                return Ok(Some(Event::ConfirmAnalysis(analysis)));
            }
            loop {
                let choice = ux::choose(
                    "Analysis",
                    &[('c', "onfirm"), ('e', "dit"), ('b', "rief"), ('r', "eset"), ('q', "uit")],
                );
                match choice {
                    'c' => return Ok(Some(Event::ConfirmAnalysis(analysis))),
                    'e' => match ux::edit_json(&analysis) {
                        Ok(edited) => return Ok(Some(Event::ConfirmAnalysis(edited))),
                        Err(e) => println!("{e:#}"),
                    },
                    'b' => {
                        if let Some(ev) = revise_brief(wf) {
                            return Ok(Some(ev));
                        }
                    }
                    'r' => {
                        if let Some(ev) = reset() {
                            return Ok(Some(ev));
                        }
                    }
                    _ => return Ok(None),
                }
            }
        }
        Step::Result => {
            let Some(design) = wf.design().cloned() else { bail!("design missing at result step") };
            ux::show_checkpoint(&design_architect::Checkpoint::Design(design.clone()));
            if cfg.auto_approve {
                return Ok(Some(Event::GenerateVisuals(design.stages)));
            }
            loop {
                let choice = ux::choose(
                    "Design",
                    &[
                        ('v', "isualize"),
                        ('f', "refine"),
                        ('e', "dit stages"),
                        ('b', "rief"),
                        ('r', "eset"),
                        ('q', "uit"),
                    ],
                );
                match choice {
                    'v' => return Ok(Some(Event::GenerateVisuals(design.stages))),
                    'f' => return Ok(Some(Event::Refine(design.stages))),
                    'e' => match ux::edit_json::<Vec<DesignStage>>(&design.stages) {
                        Ok(stages) => {
                            if ux::confirm("Refine the design with the edited stages? (n = visualize directly)") {
                                return Ok(Some(Event::Refine(stages)));
                            }
                            return Ok(Some(Event::GenerateVisuals(stages)));
                        }
                        Err(e) => println!("{e:#}"),
                    },
                    'b' => {
                        if let Some(ev) = revise_brief(wf) {
                            return Ok(Some(ev));
                        }
                    }
                    'r' => {
                        if let Some(ev) = reset() {
                            return Ok(Some(ev));
                        }
                    }
                    _ => return Ok(None),
                }
            }
        }
        Step::VisualResult => {
            if let Some(visual) = wf.visual().cloned() {
                ux::show_checkpoint(&design_architect::Checkpoint::Visual(visual));
            }
            if cfg.auto_approve {
                return Ok(None);
            }
            loop {
                match ux::choose("Visuals", &[('b', "ack to design"), ('r', "eset"), ('q', "uit")]) {
                    'b' => return Ok(Some(Event::Back)),
                    'r' => {
                        if let Some(ev) = reset() {
                            return Ok(Some(ev));
                        }
                    }
                    _ => return Ok(None),
                }
            }
        }
        busy => bail!("no input accepted while {busy:?} is running"),
    }
}

/// Edit the project brief and send it back for a fresh analysis.
fn revise_brief(wf: &Workflow) -> Option<Event> {
    match ux::edit_json(wf.project()) {
        Ok(project) => Some(Event::SubmitProject(project)),
        Err(e) => {
            println!("{e:#}");
            None
        }
    }
}

fn reset() -> Option<Event> {
    ux::confirm(RESET_WARNING).then_some(Event::Reset)
}
