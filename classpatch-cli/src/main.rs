mod config;
mod explain;

use anyhow::Context;
use camino::Utf8PathBuf;
use classpatch_core::adapters::{FsClassSetSource, FsWritePort};
use classpatch_core::pipeline::{ToolError, run_merge, write_merge_artifacts};
use classpatch_core::settings::MergeSettings;
use classpatch_types::annotation::Action;
use classpatch_types::report::{Level, ToolInfo};
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "classpatch",
    version,
    about = "Overlay a patch class set onto a source class set."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge a patch class set onto a source class set.
    Merge(MergeArgs),
    /// Explain what a patch action does, including its package semantics.
    Explain(ExplainArgs),
    /// List all patch actions.
    ListActions(ListActionsArgs),
}

#[derive(Debug, Parser)]
struct MergeArgs {
    /// Source class set (classpatch.classes.v1 JSON).
    #[arg(long)]
    source: Utf8PathBuf,

    /// Patch class set (classpatch.classes.v1 JSON).
    #[arg(long)]
    patch: Utf8PathBuf,

    /// Output directory for merge artifacts (default: artifacts/classpatch).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Config file (default: ./classpatch.toml if present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Action for patch classes without a directive.
    #[arg(long)]
    default_action: Option<Action>,

    /// Dotted package holding the directive classes.
    #[arg(long)]
    annotation_package: Option<String>,

    /// Process classes in the annotation package like any other patch class.
    #[arg(long, default_value_t = false)]
    no_auto_ignore: bool,

    /// Log at debug level.
    #[arg(long, default_value_t = false, conflicts_with_all = ["verbose", "quiet"])]
    debug: bool,

    /// Log at info level.
    #[arg(long, default_value_t = false, conflicts_with = "quiet")]
    verbose: bool,

    /// Log errors only.
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

impl MergeArgs {
    fn overrides(&self) -> CliOverrides {
        let level = if self.debug {
            Some(Level::Debug)
        } else if self.verbose {
            Some(Level::Info)
        } else if self.quiet {
            Some(Level::Error)
        } else {
            None
        };
        CliOverrides {
            level,
            default_action: self.default_action,
            annotation_package: self.annotation_package.clone(),
            no_auto_ignore: self.no_auto_ignore,
        }
    }
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Action to explain (e.g., "replace", "remove").
    action: String,
}

#[derive(Debug, Parser)]
struct ListActionsArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Merge(args) => cmd_merge(args),
        Command::Explain(args) => {
            init_tracing(Level::Warn);
            cmd_explain(args).map(|()| ExitCode::SUCCESS)
        }
        Command::ListActions(args) => {
            init_tracing(Level::Warn);
            cmd_list_actions(args).map(|()| ExitCode::SUCCESS)
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_file_config(args: &MergeArgs) -> anyhow::Result<config::ClasspatchConfig> {
    match &args.config {
        Some(path) => config::load_config(path),
        None => config::load_or_default(&Utf8PathBuf::from(".")),
    }
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<ExitCode> {
    let file_config = match load_file_config(&args).context("load classpatch.toml config") {
        Ok(config) => config,
        Err(e) => {
            init_tracing(Level::Warn);
            return Err(e);
        }
    };
    let options = ConfigMerger::new(file_config).merge_cli_args(&args.overrides());
    init_tracing(options.log_level);
    debug!("merged config: {:?}", options);

    let settings = MergeSettings {
        source: args.source,
        patch: args.patch,
        out_dir: args
            .out_dir
            .unwrap_or_else(|| Utf8PathBuf::from("artifacts/classpatch")),
        options,
    };
    let tool = ToolInfo {
        name: "classpatch".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    };
    let port = FsClassSetSource::new(settings.source.clone(), settings.patch.clone());

    let outcome = match run_merge(&settings, &port, tool) {
        Ok(outcome) => outcome,
        Err(ToolError::Internal(e)) => return Err(e),
        Err(e) => return Err(e.into()),
    };
    write_merge_artifacts(&outcome, &settings.out_dir, &FsWritePort)
        .with_context(|| format!("write artifacts to {}", settings.out_dir))?;

    let counts = &outcome.report.counts;
    println!(
        "classpatch: {} classes written to {}",
        counts.output_classes,
        settings.out_dir.join("classes.json")
    );
    println!("{} error(s), {} warning(s)", counts.errors, counts.warnings);

    match outcome.check() {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(_) => Ok(ExitCode::from(1)),
    }
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    use explain::{list_action_names, lookup_action};

    let Some(entry) = lookup_action(&args.action) else {
        let available = list_action_names().join(", ");
        anyhow::bail!(
            "Unknown action: '{}'\n\nAvailable actions: {}",
            args.action,
            available
        );
    };

    println!("================================================================================");
    println!("ACTION: {}", entry.title);
    println!("================================================================================");
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", entry.description);
    println!();

    if let Some(package) = entry.package_semantics {
        println!("PACKAGE MARKERS");
        println!("--------------------------------------------------------------------------------");
        println!("{}", package);
        println!();
    }

    println!("ELEMENTS");
    println!("--------------------------------------------------------------------------------");
    if entry.elements.is_empty() {
        println!("  (none)");
    }
    for element in entry.elements {
        println!("  - {}", element);
    }
    println!();

    Ok(())
}

fn cmd_list_actions(args: ListActionsArgs) -> anyhow::Result<()> {
    use explain::ACTION_REGISTRY;

    match args.format {
        OutputFormat::Text => {
            println!("Available actions:\n");
            println!("  {:<10} {:<8} TITLE", "ACTION", "PACKAGE");
            println!("  {:<10} {:<8} -----", "------", "-------");
            for entry in ACTION_REGISTRY {
                let package = if entry.package_semantics.is_some() {
                    "yes"
                } else {
                    "-"
                };
                println!("  {:<10} {:<8} {}", entry.action.name(), package, entry.title);
            }
            println!();
            println!("Use 'classpatch explain <action>' for details.");
        }
        OutputFormat::Json => {
            let actions: Vec<_> = ACTION_REGISTRY
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "action": a.action,
                        "title": a.title,
                        "package": a.package_semantics.is_some(),
                        "elements": a.elements,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&actions)?);
        }
    }
    Ok(())
}
