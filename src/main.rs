use std::sync::Arc;

use clap::Parser;
use pummeluff_console::cli::commands::{cmd_actions, cmd_latest, cmd_registry, cmd_submit, cmd_watch};
use pummeluff_console::cli::config::{
    Cli, Commands, load_config, resolve_backend, resolve_poll_interval, resolve_timeout,
    resolve_trace_file,
};
use pummeluff_console::console::session::SessionConfig;
use pummeluff_console::transport::http::HttpTransport;
use pummeluff_console::transport::transport::SubmitKind;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Resolve backend settings: CLI > config > defaults
    let backend = resolve_backend(cli.backend.as_deref(), &config);
    let transport = HttpTransport::new(&backend, resolve_timeout(&config))?;

    if cli.verbose > 0 {
        eprintln!("Backend: {}", backend);
    }

    match cli.command {
        Commands::Watch {
            poll_interval_ms,
            trace,
        } => {
            let session_config = SessionConfig {
                poll_interval: resolve_poll_interval(poll_interval_ms, &config),
                verbose: cli.verbose,
                trace_file: resolve_trace_file(trace.as_deref(), &config),
            };
            cmd_watch(Arc::new(transport), session_config)?;
        }
        Commands::Registry { format, output } => {
            cmd_registry(&transport, &format, output.as_deref(), cli.verbose)?;
        }
        Commands::Actions => {
            cmd_actions(&transport)?;
        }
        Commands::Latest => {
            cmd_latest(&transport)?;
        }
        Commands::Register(args) => {
            if !cmd_submit(&transport, SubmitKind::Register, &args, cli.verbose)? {
                std::process::exit(1);
            }
        }
        Commands::Unregister(args) => {
            if !cmd_submit(&transport, SubmitKind::Unregister, &args, cli.verbose)? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
