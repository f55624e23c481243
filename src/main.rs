//! cpe-catalog: searchable CPE catalog with update diffs and tool matching

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use cpe_catalog::{cli, config};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cpe-catalog")]
#[command(version)]
#[command(about = "Searchable CPE catalog with feed update diffs and tool-to-CPE matching", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Failure

EXAMPLES:
    # First run: create the index, fetch the feed and index it
    cpe-catalog full-pipeline

    # Refresh the catalog and write diff reports
    cpe-catalog update --force-download

    # Match a tool inventory
    cpe-catalog match-csv tools.csv --tool-col 1 --website-col 2")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "CPE_CATALOG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `match-csv` subcommand
#[derive(Parser)]
struct MatchCsvArgs {
    /// CSV file listing the tools
    csv_file: PathBuf,

    /// Tool name column index (0-based)
    #[arg(long, default_value = "1")]
    tool_col: usize,

    /// Website column index (0-based)
    #[arg(long, default_value = "2")]
    website_col: usize,

    /// Output file path
    #[arg(long, default_value = "cpe_matches.csv")]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the backend connection and create the index
    Setup {
        /// Recreate an existing index without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Download and extract the NVD CPE feed
    Download {
        /// Download even when the archive is present
        #[arg(long)]
        force: bool,
    },

    /// Parse the extracted feed and index it
    ParseAndIndex,

    /// Delete and recreate the index with the current mapping
    RecreateIndex,

    /// Run a few example searches
    SearchDemo,

    /// Interactive search mode
    Search,

    /// Run setup, download and parse-and-index
    FullPipeline {
        /// Download even when the archive is present
        #[arg(long)]
        force_download: bool,
    },

    /// Match tools from a CSV file against the catalog
    MatchCsv(MatchCsvArgs),

    /// Update the catalog from the latest feed and write diff reports
    Update {
        /// Download even when the archive is present
        #[arg(long)]
        force_download: bool,

        /// Skip backup and diff generation
        #[arg(long)]
        no_diff: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example cpe-catalog.yaml in the current directory
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let explicit_config = cli.config.as_deref();
    let colored = !cli.no_color && std::env::var_os("NO_COLOR").is_none();

    match cli.command {
        Commands::Setup { yes } => {
            let config = cli::load_config(explicit_config)?;
            cli::run_setup(&config, yes)
        }

        Commands::Download { force } => {
            let config = cli::load_config(explicit_config)?;
            cli::run_download(&config, force)
        }

        Commands::ParseAndIndex => {
            let config = cli::load_config(explicit_config)?;
            cli::run_parse_and_index(&config)
        }

        Commands::RecreateIndex => {
            let config = cli::load_config(explicit_config)?;
            cli::run_recreate_index(&config)
        }

        Commands::SearchDemo => {
            let config = cli::load_config(explicit_config)?;
            cli::run_search_demo(&config, colored && !config.output.no_color)
        }

        Commands::Search => {
            let config = cli::load_config(explicit_config)?;
            if let Err(e) = cli::run_interactive_search(&config, colored && !config.output.no_color)
            {
                eprintln!("Error: {e:#}");
            }
            Ok(())
        }

        Commands::FullPipeline { force_download } => {
            let config = cli::load_config(explicit_config)?;
            cli::run_full_pipeline(&config, force_download, colored && !config.output.no_color)
        }

        Commands::MatchCsv(args) => {
            let config = cli::load_config(explicit_config)?;
            cli::run_match_csv(
                &config,
                &args.csv_file,
                args.tool_col,
                args.website_col,
                args.output,
                colored && !config.output.no_color,
            )
        }

        Commands::Update {
            force_download,
            no_diff,
        } => {
            let config = cli::load_config(explicit_config)?;
            let exit_code = cli::run_update(
                &config,
                force_download,
                no_diff,
                colored && !config.output.no_color,
            )?;
            if exit_code != cli::exit_codes::SUCCESS {
                std::process::exit(exit_code);
            }
            Ok(())
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "cpe-catalog", &mut io::stdout());
            Ok(())
        }

        Commands::ConfigSchema { output } => {
            let schema = config::generate_json_schema().context("failed to render schema")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) = config::load_or_default(explicit_config);
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(())
            }
            ConfigAction::Path => {
                eprintln!("Config file search paths (in order):");
                for dir in config::search_dirs() {
                    eprintln!("  {}", dir.display());
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in config::CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match config::discover_config_file(explicit_config) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(())
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(config::CONFIG_FILE_NAMES[0]);
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                std::fs::write(&target, config::generate_example_config())
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(())
            }
        },
    }
}
