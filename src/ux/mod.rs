use anyhow::{bail, Context};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::process::Command;
use std::time::Duration;

use design_architect::wire::{AnalysisResult, DesignResult, ProjectInput, VisualResult};
use design_architect::workflow::{Checkpoint, Failure, Step};
use design_architect::GenerationError;

pub fn show_header(step: Step) {
    if let Some(label) = step.label() {
        println!("\n{}", format!("=== {label} ===").bold());
    }
}

pub fn show_failure(f: &Failure) {
    println!("{} {}", "⚠".red().bold(), f.message.red().bold());
    println!("  {}", f.cause.to_string().dimmed());
}

pub fn show_fatal(e: &GenerationError) {
    eprintln!("{} {}", "fatal:".red().bold(), e);
}

pub fn show_checkpoint(c: &Checkpoint) {
    match c {
        Checkpoint::Project(p) => show_project(p),
        Checkpoint::Analysis(a) => show_analysis(a),
        Checkpoint::Design(d) => show_design(d),
        Checkpoint::Visual(v) => show_visual(v),
    }
}

fn field(name: &str, value: &str) {
    let shown = if value.trim().is_empty() { "(empty)".dimmed().to_string() } else { value.to_string() };
    println!("  {:<16} {}", name.cyan(), shown);
}

fn show_project(p: &ProjectInput) {
    println!("{}", "Project".bold());
    field("projectName", &p.project_name);
    field("coreGoal", &p.core_goal);
    field("targetAudience", &p.target_audience);
    field("cycle", &p.cycle);
    field("coreMetaphor", &p.core_metaphor);
    field("keyActions", &p.key_actions);
    field("moodKeywords", &p.mood_keywords);
    field("wildIdeas", &p.wild_ideas);
}

fn show_analysis(a: &AnalysisResult) {
    println!("{}", "Anchors".bold());
    field("identity", &a.anchors.identity);
    field("background", &a.anchors.background);
    field("coreNeed", &a.anchors.core_need);
    println!("{}", "Logic risks".bold());
    for (i, r) in a.risks.iter().enumerate() {
        println!("{}. {}  {}", i + 1, format!("[{}]", r.category.label()).yellow().bold(), r.risk);
        println!("   {} {}", "→".green(), r.solution);
    }
    println!("{}", "Summary".bold());
    println!("  {}", a.raw_analysis);
}

fn show_design(d: &DesignResult) {
    println!("{}", "Visual DNA".bold());
    field("typography", &d.visual_dna.typography);
    field("controls", &d.visual_dna.controls);
    field("lighting", &d.visual_dna.lighting);
    for s in &d.stages {
        println!("\n{} {}", format!("Stage {}", s.stage_number).magenta().bold(), s.stage_name.bold());
        println!("  {} {}", "logic:".cyan(), s.logic);
        println!("  {} {}", "visuals:".cyan(), s.visuals);
    }
}

fn show_visual(v: &VisualResult) {
    println!("{}", "NANO PRO keyframes".bold());
    for (i, k) in v.keyframes.iter().enumerate() {
        println!("\n{} {}", format!("#{:02}", i + 1).magenta().bold(), k.step_name.bold());
        println!("  {} {}", "purpose:".cyan(), k.logic_purpose);
        println!("  {} {}", "prompt:".cyan(), k.nano_prompt);
    }
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    match read_answer() {
        Some(ans) => {
            let ans = ans.to_lowercase();
            ans == "y" || ans == "yes"
        }
        None => false,
    }
}

/// Read one trimmed line. `None` once stdin is closed or unreadable.
fn read_answer() -> Option<String> {
    read_answer_from(&mut io::stdin().lock())
}

fn read_answer_from(input: &mut impl BufRead) -> Option<String> {
    let mut s = String::new();
    match input.read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()),
    }
}

pub fn ask(prompt: &str) -> Option<String> {
    print!("{}: ", prompt);
    let _ = io::stdout().flush();
    read_answer()
}

/// Single-letter menu. Repeats until one of the option keys is entered;
/// a closed stdin answers `'q'`.
pub fn choose(prompt: &str, options: &[(char, &str)]) -> char {
    choose_from(&mut io::stdin().lock(), prompt, options)
}

fn choose_from(input: &mut impl BufRead, prompt: &str, options: &[(char, &str)]) -> char {
    let menu = options
        .iter()
        .map(|(k, label)| format!("[{}]{}", k.to_string().bold(), label))
        .collect::<Vec<_>>()
        .join("  ");
    loop {
        print!("{prompt}  {menu}: ");
        let _ = io::stdout().flush();
        let Some(ans) = read_answer_from(input) else {
            return 'q';
        };
        if let Some(c) = ans.chars().next().map(|c| c.to_ascii_lowercase()) {
            if options.iter().any(|(k, _)| *k == c) {
                return c;
            }
        }
    }
}

/// Spinner for a busy step; hidden for steps without progress text.
pub fn spinner(step: Step) -> ProgressBar {
    let Some((title, subtitle)) = step.progress() else {
        return ProgressBar::hidden();
    };
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("{}  {}", title.bold(), subtitle.dimmed()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Round-trip a value through `$EDITOR` as pretty JSON.
pub fn edit_json<T: Serialize + DeserializeOwned>(value: &T) -> anyhow::Result<T> {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile()?;
    file.write_all(serde_json::to_string_pretty(value)?.as_bytes())?;
    file.flush()?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor)
        .arg(file.path())
        .status()
        .with_context(|| format!("failed to launch editor {editor}"))?;
    if !status.success() {
        bail!("editor {editor} exited with {status}");
    }

    let edited = fs_err::read_to_string(file.path())?;
    serde_json::from_str(&edited).context("edited value is not valid JSON for this stage")
}
