//! shell-mirror binary entry point.

use std::process::ExitCode;

use shell_mirror::api::{serve_with_state, AppState};
use shell_mirror::cli::{parse_args, print_help, print_version};
use shell_mirror::config::Config;
use shell_mirror::{logging, InputForwarder, ShellHost, TerminalHandle};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'shell-mirror --help' for more information.");
            return ExitCode::from(2);
        }
    };

    if args.help {
        print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_with_filter(config.log_filter()) {
        eprintln!("warning: logging already initialized: {}", e);
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> shell_mirror::Result<()> {
    info!("shell-mirror v{}", env!("CARGO_PKG_VERSION"));

    let terminal = TerminalHandle::new(config.terminal)?;
    let input = InputForwarder::new();

    // keep serving snapshots even when the shell cannot start
    let host = match ShellHost::spawn(&config.to_spawn_options(), terminal.clone(), input.clone())
    {
        Ok(host) => {
            info!("shell running with PID {}", host.pid());
            Some(host)
        }
        Err(e) => {
            warn!("failed to start shell, input disabled: {}", e);
            None
        }
    };

    let server = config
        .to_server_config()
        .map_err(|e| shell_mirror::ShellMirrorError::InvalidConfig(e.to_string()))?;
    let window = host.as_ref().map(ShellHost::window).unwrap_or_default();
    let state = AppState::new(terminal, input).with_window(window);

    let result = serve_with_state(server, state, shutdown_signal()).await;

    if let Some(host) = host {
        host.shutdown()?;
    }
    result
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
