mod commands;
mod manifest;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::Context;
use lacework_config::ConfigOverrides;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lwprov")]
#[command(about = "Declarative management of Lacework integrations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding `.lwprov/state.json`
    #[arg(long, global = true, env = "LWPROV_STATE_DIR", default_value = ".")]
    state_dir: PathBuf,

    /// Profile in ~/.lacework.toml
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Lacework account (`acme` or `acme.lacework.net`)
    #[arg(short, long, global = true)]
    account: Option<String>,

    /// Sub-account to manage
    #[arg(long, global = true)]
    subaccount: Option<String>,

    #[arg(long, global = true)]
    api_key: Option<String>,

    #[arg(long, global = true)]
    api_secret: Option<String>,

    /// Overall time allowed for retried creates, in seconds
    #[arg(long, global = true, default_value = "300")]
    create_timeout: u64,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the changes apply would make
    Plan {
        /// Resource manifest
        #[arg(short = 'f', long, default_value = "lacework.yaml")]
        file: PathBuf,
        /// Plan against local state only
        #[arg(long)]
        no_refresh: bool,
    },
    /// Create, update and delete integrations to match the manifest
    Apply {
        /// Resource manifest
        #[arg(short = 'f', long, default_value = "lacework.yaml")]
        file: PathBuf,
        /// Skip re-reading tracked integrations first
        #[arg(long)]
        no_refresh: bool,
    },
    /// Delete tracked integrations
    Destroy {
        /// Only destroy the resources this manifest declares
        #[arg(short = 'f', long)]
        file: Option<PathBuf>,
    },
    /// Re-read every tracked integration into state
    Refresh,
    /// Start tracking an existing integration
    Import {
        /// Resource type, e.g. lacework_alert_channel_slack
        resource_type: String,
        /// Local resource name
        name: String,
        /// Integration guid (INTG_GUID)
        guid: String,
    },
    /// Show tracked resources
    Show,
    /// List supported resource types
    Types,
    /// List the integrations Lacework holds for a resource type
    Remote {
        /// Resource type, e.g. lacework_integration_aws_cfg
        resource_type: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "lacework_cli=debug,lacework_provider=debug,lacework_api=debug,lacework_config=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context {
        state_dir: cli.state_dir,
        overrides: ConfigOverrides {
            account: cli.account,
            subaccount: cli.subaccount,
            api_key: cli.api_key,
            api_secret: cli.api_secret,
            profile: cli.profile,
        },
        create_timeout: Duration::from_secs(cli.create_timeout),
    };

    match cli.command {
        Commands::Plan { file, no_refresh } => commands::plan::handle(&ctx, &file, !no_refresh).await,
        Commands::Apply { file, no_refresh } => {
            commands::apply::handle(&ctx, &file, !no_refresh).await
        }
        Commands::Destroy { file } => commands::destroy::handle(&ctx, file.as_deref()).await,
        Commands::Refresh => commands::refresh::handle(&ctx).await,
        Commands::Import {
            resource_type,
            name,
            guid,
        } => commands::import::handle(&ctx, &resource_type, &name, &guid).await,
        Commands::Show => commands::show::handle(&ctx).await,
        Commands::Types => {
            commands::types::handle(&ctx);
            Ok(())
        }
        Commands::Remote { resource_type } => commands::remote::handle(&ctx, &resource_type).await,
    }
}
