// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// bw2qr — print Bitwarden favourites as verified QR code sheets.
//
// Entry point. Initialises logging, parses the command line and runs the
// selected subcommand. Any error is printed and the process exits with -1.

mod args;
mod commands;
mod status;

use clap::Parser;

use args::Cli;

fn main() {
    // Status lines go to stdout; keep the log quiet unless RUST_LOG asks.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "bw2qr starting");

    if let Err(err) = commands::run(cli.command) {
        eprintln!("error: {}", status::describe(&err));
        std::process::exit(-1);
    }
}
