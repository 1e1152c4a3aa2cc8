use anyhow::{Context, Result};
use binsense::config::EngineConfig;
use binsense::engine::Engine;
use binsense::schema::{ModelOutput, RootCategory, Verdict};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use is_terminal::IsTerminal;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "binsense",
    about = "Waste classification verdict utilities",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Explicit config file (TOML); default is the user config directory
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one model output document
    Classify(ClassifyArgs),
    /// Show the active engine settings and rule tables
    Rules(RulesArgs),
    /// Print the JSON Schema for verdicts
    Schema,
}

#[derive(Args, Clone)]
struct ClassifyArgs {
    /// Model output JSON; stdin when omitted or "-"
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output JSON (stable schema)
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct RulesArgs {
    /// Output JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("binsense: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load_strict(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::load(),
    };

    if cli.no_color || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Classify(args) => classify(&args, config),
        Commands::Rules(args) => rules(&args, &config),
        Commands::Schema => {
            let schema = schemars::schema_for!(Verdict);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn classify(args: &ClassifyArgs, config: EngineConfig) -> Result<()> {
    let raw = read_input(args.input.as_deref())?;
    let output: ModelOutput =
        serde_json::from_str(&raw).context("input is not a model output document")?;
    let verdict = Engine::new(config).classify(&output);
    if args.json {
        println!("{}", serde_json::to_string(&verdict)?);
    } else {
        print_verdict(&verdict);
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn colorize_winner(verdict: &Verdict) -> String {
    match verdict.winner.as_deref() {
        None => "none".red().to_string(),
        Some(name) if verdict.is_target => name.green().to_string(),
        Some(name) => name.to_string(),
    }
}

fn print_verdict(verdict: &Verdict) {
    println!("{} {}", "Verdict:".bold().cyan(), colorize_winner(verdict));
    println!(
        "{} {}",
        "Target category:".bold().cyan(),
        if verdict.is_target {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        }
    );
    if !verdict.breakdown.is_empty() {
        println!("{}", "Scores:".bold().cyan());
        for (root, score) in &verdict.breakdown {
            println!("  {root} = {score:.3}");
        }
    }
    if !verdict.detections.is_empty() {
        println!("{}", "Detections:".bold().cyan());
        for detection in &verdict.detections {
            let mut line = format!(
                "  {} ({:.2}) -> {}",
                detection.label, detection.confidence, detection.root
            );
            if let Some(bbox) = detection.bbox {
                line.push_str(&format!(
                    " [{}, {}, {}, {}]",
                    bbox.x1(),
                    bbox.y1(),
                    bbox.x2(),
                    bbox.y2()
                ));
            }
            if detection.is_target {
                line.push_str(" *");
            }
            println!("{line}");
        }
    }
}

fn rules(args: &RulesArgs, config: &EngineConfig) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("{}", "Engine:".bold().cyan());
    println!("  policy = {}", config.policy.as_str());
    println!("  top_k = {}", config.top_k);
    println!("  min_probability = {}", config.min_probability);
    println!("  display_threshold = {}", config.display_threshold);
    println!("  target = {}", config.target.as_str());

    let tables = &config.tables;
    println!("{}", "Roots:".bold().cyan());
    for root in RootCategory::ALL {
        println!("  {} = {}", root.as_str(), tables.roots.name_of(root));
    }
    println!("{}", "Aliases:".bold().cyan());
    for (from, to) in &tables.aliases {
        println!("  {from} -> {to}");
    }
    println!("{}", "Label map:".bold().cyan());
    for (label, root) in &tables.label_map {
        println!("  {label} -> {}", tables.roots.name_of(*root));
    }
    println!("{}", "Keywords:".bold().cyan());
    for root in RootCategory::ALL {
        println!(
            "  {}: {}",
            root.as_str(),
            tables.keywords.for_root(root).join(", ")
        );
    }
    Ok(())
}
