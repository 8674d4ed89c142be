mod cli;
mod commands;
mod envelope;
mod error;
mod metadata;
mod output;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::time::MissedTickBehavior;

use crate::cli::{Cli, Command};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    // stdout carries the envelope; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    let mut context = Context::from_cli(&cli)?;

    let watch = match &cli.command {
        Command::Dashboard(args) => args.watch.filter(|secs| *secs > 0),
        _ => None,
    };
    let Some(secs) = watch else {
        return render_once(&cli, &context).await;
    };

    let mut interval = tokio::time::interval(Duration::from_secs(secs));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut code = ExitCode::SUCCESS;
    loop {
        tokio::select! {
            _ = interval.tick() => {
                code = render_once(&cli, &context).await?;
                context.advance_watch_tick();
            }
            _ = &mut shutdown => {
                tracing::info!("watch interrupted");
                return Ok(code);
            }
        }
    }
}

async fn render_once(cli: &Cli, context: &Context) -> Result<ExitCode, CliError> {
    let envelope = commands::run(cli, context).await?;
    output::render(&envelope, cli.format, cli.pretty)?;

    if cli.strict && (!envelope.meta.warnings.is_empty() || envelope.has_errors()) {
        return Err(CliError::StrictModeViolation {
            warning_count: envelope.meta.warnings.len(),
            error_count: envelope.errors.len(),
        });
    }

    if envelope.has_errors() {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
