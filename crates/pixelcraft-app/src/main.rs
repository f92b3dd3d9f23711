// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PixelCraft command-line host.

mod cli;
mod host;

use std::process::ExitCode;

use pixelcraft_core::human_errors::{humanize_error, humanize_kind, summarize_outcome};

fn main() -> ExitCode {
    let args = cli::CliArgs::from_matches(&cli::command().get_matches());

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("PixelCraft starting");

    match host::run(&args) {
        Ok(outcome) => {
            println!("{}", summarize_outcome(&outcome));
            for failure in &outcome.failures {
                let human = humanize_kind(failure.kind);
                eprintln!("  {}: {} {}", failure.original_name, human.message, human.suggestion);
            }
            if outcome.failures.is_empty() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(3)
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "Batch not run");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            if host::is_usage_error(&err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
