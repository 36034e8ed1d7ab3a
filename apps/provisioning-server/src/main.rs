use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};

use api_ingress::{ApiIngress, ApiIngressConfig};
use user_provisioning::{UserProvisioningConfig, UserProvisioningModule};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Provisioning Server - operational user accounts for the organization directory
#[derive(Parser)]
#[command(name = "provisioning-server")]
#[command(about = "Provisioning Server - operational user accounts for the organization directory")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use the in-memory directory instead of Microsoft Graph
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Initialize logging
    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Provisioning Server starting");

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Execute command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config, args),
    }
}

/// Wire the provisioning module into the HTTP host.
fn build_ingress(config: &AppConfig, args: &CliArgs) -> Result<ApiIngress> {
    let provisioning_cfg: UserProvisioningConfig = config
        .module_config(user_provisioning::MODULE_NAME)?
        .with_context(|| {
            format!(
                "Missing configuration section 'modules.{}'",
                user_provisioning::MODULE_NAME
            )
        })?;
    let provisioning = UserProvisioningModule::from_config(provisioning_cfg, args.mock)?;

    let ingress_cfg: ApiIngressConfig = config
        .module_config(api_ingress::MODULE_NAME)?
        .unwrap_or_default();
    let ingress = ApiIngress::new(ingress_cfg);
    ingress.default_bind_addr(config.server.bind_addr());
    ingress.register(provisioning.router(), provisioning.openapi());

    Ok(ingress)
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");
    let ingress = build_ingress(&config, &args)?;

    let cancel = modkit::cancel_on_signal();
    ingress.serve(cancel).await?;

    tracing::info!("Provisioning Server stopped");
    Ok(())
}

fn check_config(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Checking configuration...");

    let ingress = build_ingress(&config, &args)?;
    ingress.build_router()?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Server config:");
    println!("{}", config.to_yaml()?);

    Ok(())
}
