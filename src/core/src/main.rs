use clap::Parser;
use kt_mirror::configuration::config::{Cli, Command, ProxyArgs, ReplayArgs};
use kt_mirror::network::start_mirror_proxy;
use kt_mirror::replay::replay;
use log::{error, info};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Command::Proxy(args) => run_proxy(args).await,
        Command::Replay(args) => run_replay(args).await,
    };
    std::process::exit(code);
}

async fn run_proxy(args: ProxyArgs) -> i32 {
    let mirror = match args.resolve() {
        Ok(m) => m,
        Err(e) => {
            error!("Unable to import configuration: {}", e);
            return 1;
        }
    };
    if !mirror.enabled() {
        info!("No mirror target or log path configured, relaying only");
    }

    for port in &args.local_ports {
        let mut config = mirror.clone();
        if config.local_address.is_empty() {
            config.local_address = format!("127.0.0.1:{}", port);
        }
        match start_mirror_proxy(*port, config).await {
            Ok(proxy_port) => println!("{} -> {}", port, proxy_port),
            Err(e) => {
                error!("Unable to start mirror proxy for local port {}: {}", port, e);
                return 1;
            }
        }
    }

    info!("Mirror proxies running, press Ctrl-C to stop");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for shutdown signal: {}", e);
        return 1;
    }
    info!("Shutting down");
    0
}

async fn run_replay(args: ReplayArgs) -> i32 {
    let config = match args.resolve() {
        Ok(c) => c,
        Err(e) => {
            error!("Unable to import configuration: {}", e);
            return 1;
        }
    };
    match replay(&config.log_path, &config.target).await {
        Ok(report) => {
            info!(
                "Replay finished: {} file(s) sent, {} empty file(s) skipped",
                report.replayed.len(),
                report.skipped.len()
            );
            0
        }
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}
