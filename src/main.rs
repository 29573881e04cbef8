use clap::{Arg, ArgAction, Command};
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{config::FileConfigStore, http::router};
use application::Marketplace;
use ports::{AppConfig, ConfigStore};

fn cli() -> Command {
    Command::new("bidboard")
        .version("0.1.0")
        .about("Freelance marketplace backend: projects, bids and assignments")
        .long_about("Serves the project/bid HTTP API.\n\nConfiguration is read from the config file, then BIDBOARD_PORT / BIDBOARD_BIND, then the flags below.")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("Configuration file (defaults to <config dir>/bidboard/config.json)")
                .global(true)
        )
        .arg(
            Arg::new("port")
                .long("port")
                .short('p')
                .value_name("PORT")
                .value_parser(clap::value_parser!(u16))
                .help("Port to listen on")
                .global(true)
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .value_name("ADDRESS")
                .help("Address to bind to")
                .global(true)
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP server (default)")
        )
        .subcommand(
            Command::new("config")
                .about("Print the effective configuration as JSON")
                .arg(
                    Arg::new("save")
                        .long("save")
                        .action(ArgAction::SetTrue)
                        .help("Write the effective configuration back to the config file")
                )
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = cli().get_matches();

    // Load configuration
    let config_store = match matches.get_one::<String>("config") {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new()?,
    };
    let mut config = config_store.load_config().await?;

    // Command line flags win over file and environment
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    if let Some(bind) = matches.get_one::<String>("bind") {
        config.bind_address = bind.clone();
    }

    match matches.subcommand() {
        Some(("config", config_matches)) => {
            println!("{}", serde_json::to_string_pretty(&config)?);

            if config_matches.get_flag("save") {
                config_store.save_config(&config).await?;
                eprintln!("Saved configuration to {}", config_store.path().display());
            }
        }
        Some(("serve", _)) | None => serve(config).await?,
        _ => {
            eprintln!("Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Initializing state...");
    let app = router(Marketplace::in_memory(&config));

    let address = config.listen_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
