use jiopad::{cli, ui, Config, Daemon};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = cli::parse_args();

    // Initialize logging
    init_logging(&args);

    ui::print_banner(env!("CARGO_PKG_VERSION"));

    // Load configuration (use defaults unless config file is provided)
    let mut config = match &args.config_path {
        Some(config_path) => match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                ui::print_status("✗", &e, ui::StatusType::Error);
                error!("{}", e);
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    // Apply CLI overrides
    config.apply_cli_overrides(&args);

    ui::print_config_summary(&config);

    let daemon = match Daemon::new(config).await {
        Ok(d) => d,
        Err(e) => {
            ui::print_status("✗", &format!("Failed to initialize daemon: {}", e), ui::StatusType::Error);
            error!("Failed to initialize daemon: {}", e);
            process::exit(1);
        }
    };

    if let Some(name) = &args.create_wallet {
        let Some(password) = &args.wallet_password else {
            ui::print_status("✗", "--create-wallet requires --wallet-password", ui::StatusType::Error);
            error!("--create-wallet requires --wallet-password");
            process::exit(1);
        };
        if let Err(e) = daemon.create_wallet(name, password, args.wallet_accounts) {
            ui::print_status("✗", &e, ui::StatusType::Error);
            error!("{}", e);
            process::exit(1);
        }
    }

    if let Err(e) = daemon.run().await {
        ui::print_status("✗", &format!("Daemon error: {}", e), ui::StatusType::Error);
        error!("Daemon error: {}", e);
        process::exit(1);
    }

    ui::print_status("✓", "JIOPad daemon stopped gracefully", ui::StatusType::Success);
    info!("JIOPad daemon stopped gracefully");
}

fn init_logging(args: &cli::Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt().with_env_filter(filter).with_target(true).with_thread_ids(true).init();
}
