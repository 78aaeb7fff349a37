mod examples;

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Local;
use clap::{ArgAction, Parser};
use stategen_core::settings::{ai_configured, read_settings, read_settings_from, settings_path};
use stategen_core::{
    save_chat_feedback_json, save_chat_json, save_chat_text, save_solution_puml, SavedSolution,
};
use stategen_prompt::{feedback_record, review, solve, ScaleBounds, SourceFile};
use tracing_subscriber::EnvFilter;

/// Generate a PlantUML state diagram for C++ sources with an LLM.
#[derive(Parser, Debug)]
#[command(name = "stategen", version, about)]
struct Cli {
    /// Source files of the component to diagram
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Component name; used for output directory and file names
    #[arg(short, long)]
    component: String,

    /// Directory holding one reference `.png` diagram and its sources (repeatable)
    #[arg(short = 'e', long = "example", value_name = "DIR")]
    examples: Vec<PathBuf>,

    #[arg(long, default_value = "solutions")]
    solution_dir: PathBuf,

    #[arg(long, default_value = "chats")]
    chat_dir: PathBuf,

    /// Run a second pass that reviews and corrects the first diagram
    #[arg(long)]
    feedback: bool,

    /// Write `.puml` files without invoking the renderer
    #[arg(long)]
    no_render: bool,

    #[arg(long)]
    provider: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long, env = "STATEGEN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Settings file (defaults to ~/.stategen/settings.json)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Increase stderr verbosity (`-v` = info, `-vv` = debug); RUST_LOG wins when set
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Model names like `meta-llama/Llama-3` would otherwise create directories.
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect()
}

fn report(saved: &SavedSolution) {
    println!("{}", saved.puml.display());
    match &saved.render {
        Some(outcome) if outcome.success() => println!("{}", saved.image.display()),
        Some(_) => eprintln!("warning: rendering {} failed", saved.puml.display()),
        None => {}
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.settings {
        Some(path) => read_settings_from(path)?,
        None => read_settings()?,
    };
    if let Some(provider) = cli.provider {
        settings.ai.provider = provider;
    }
    if let Some(model) = cli.model {
        settings.ai.model = model;
    }
    if let Some(api_key) = cli.api_key {
        settings.ai.api_key = api_key;
    }
    if !ai_configured(&settings.ai) {
        bail!(
            "no provider configured: pass --provider/--model/--api-key or edit {}",
            cli.settings.unwrap_or_else(settings_path).display()
        );
    }

    let files = SourceFile::read_all(&cli.files)?;
    let examples = cli
        .examples
        .iter()
        .map(|dir| examples::load_example(dir))
        .collect::<Result<Vec<_>>>()?;
    let bounds = ScaleBounds::from(settings.scale);
    bounds.validate()?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let model = file_safe(&settings.ai.model);
    let render = (!cli.no_render).then_some(&settings.render);

    let first = solve(&settings.ai, &files, &examples, &bounds).await?;
    let saved = save_solution_puml(
        &first.solution,
        &cli.solution_dir,
        &cli.component,
        &model,
        &timestamp,
        render,
    )?;
    report(&saved);
    let path = save_chat_text(&first.messages, &cli.chat_dir, &cli.component, &timestamp, false)?;
    println!("{}", path.display());

    if !cli.feedback {
        let path = save_chat_json(
            &first.messages,
            &first.solution,
            &first.usage,
            &cli.chat_dir,
            &cli.component,
            &timestamp,
        )?;
        println!("{}", path.display());
        return Ok(());
    }

    let second = review(&settings.ai, &first.solution, &files).await?;
    let saved = save_solution_puml(
        &second.solution,
        &cli.solution_dir,
        &cli.component,
        &model,
        &format!("{timestamp}_feedback"),
        render,
    )?;
    report(&saved);
    let path = save_chat_text(&second.messages, &cli.chat_dir, &cli.component, &timestamp, true)?;
    println!("{}", path.display());

    let record = feedback_record(first, second);
    let path = save_chat_feedback_json(&record, &cli.chat_dir, &cli.component, &timestamp)?;
    println!("{}", path.display());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli).await
}
