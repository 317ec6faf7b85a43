//! Edge Network CLI (edgenet)

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};

use edge_network_api::context::AppContext;
use edge_network_config::ServiceConfig;
use edgenet::commands::{
    ApplyCommand, LabelsCommand, ListCommand, OutputFormat, ValidateCommand,
};

#[derive(Parser)]
#[command(name = "edgenet")]
#[command(about = "Edge device ethernet settings CLI")]
#[command(version)]
#[command(long_about = "
Edge device ethernet settings CLI

Lists, validates and applies ethernet interface settings through
NetworkManager and maintains the label map used to address interfaces.

Examples:
  edgenet list                             # Show all ethernet interfaces
  edgenet list --format json               # Same, as wire JSON
  edgenet get --mac AA:BB:CC:DD:EE:FF      # Show one interface
  edgenet get --label WAN                  # Show the interface labelled WAN
  edgenet validate -f settings.json        # Check a settings batch
  edgenet apply -f settings.json --dry-run # Same as validate
  edgenet apply -f settings.json           # Apply a settings batch
  edgenet labels show                      # Show the label map
  edgenet labels set -f labels.json        # Replace the label map
")]
struct Cli {
    /// Service configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List ethernet interfaces
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show one interface by MAC address or label
    #[command(group(ArgGroup::new("target").required(true).args(["mac", "label"])))]
    Get {
        #[arg(long)]
        mac: Option<String>,

        #[arg(long)]
        label: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate a settings file without applying it
    Validate {
        /// Settings file (wire JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Apply a settings file
    Apply {
        /// Settings file (wire JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// Perform validation only
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage the label map
    Labels {
        #[command(subcommand)]
        action: LabelsAction,
    },
}

#[derive(Subcommand)]
enum LabelsAction {
    /// Show the label map
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Replace the label map with a JSON object of label to interface name
    Set {
        #[arg(short, long)]
        file: PathBuf,
    },
}

async fn run(cli: &Cli) -> Result<String> {
    let config = ServiceConfig::load(cli.config.as_deref())?;
    let context = AppContext::bootstrap(config).await?;

    match &cli.command {
        Commands::List { format } => ListCommand::new(context).execute(*format).await,

        Commands::Get { mac, label, format } => {
            let cmd = ListCommand::new(context);
            match (mac, label) {
                (Some(mac), _) => cmd.get_by_mac(mac, *format).await,
                (None, Some(label)) => cmd.get_by_label(label, *format).await,
                (None, None) => anyhow::bail!("Either --mac or --label is required"),
            }
        }

        Commands::Validate { file } => ValidateCommand::new(context).execute(file).await,

        Commands::Apply { file, dry_run } => {
            ApplyCommand::new(context).execute(file, *dry_run).await
        }

        Commands::Labels { action } => {
            let cmd = LabelsCommand::new(context);
            match action {
                LabelsAction::Show { format } => cmd.show(*format).await,
                LabelsAction::Set { file } => cmd.set(file).await,
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Handle errors with appropriate exit codes
    match run(&cli).await {
        Ok(output) => {
            if !cli.quiet && !output.is_empty() {
                println!("{}", output);
            }
            log::info!("Command completed successfully");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);

            // Print error chain if in verbose mode
            if cli.verbose || cli.debug {
                for cause in e.chain().skip(1) {
                    eprintln!("  Caused by: {}", cause);
                }
            }
            std::process::exit(1);
        }
    }
}
