use clap::Parser;
use subway::cli::commands::execute_command;
use subway::cli::output;
use subway::cli::Cli;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

fn main() {
    let cli = Cli::parse();

    init_logging(cli.debug);

    if let Err(e) = execute_command(&cli) {
        match e.status() {
            Some(status) => output::error(&format!("{status}: {e}")),
            None => output::error(&e),
        }
        std::process::exit(e.exit_code());
    }
}

/// Crate-scoped filter from `-d` repeats; `RUST_LOG` replaces it entirely when set.
fn log_filter(verbosity: u8) -> EnvFilter {
    if std::env::var_os("RUST_LOG").is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    EnvFilter::new(format!("warn,subway={level}"))
}

fn init_logging(verbosity: u8) {
    if verbosity > 3 {
        eprintln!("-d accepts at most three repeats, using trace");
    }

    // stdout carries command output; logs go to stderr
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .with_span_events(if verbosity >= 3 {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        })
        .with_filter(log_filter(verbosity));

    tracing_subscriber::registry().with(layer).init();
    tracing::debug!(verbosity, "logging ready");
}
