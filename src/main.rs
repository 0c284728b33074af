// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::PathBuf;

use loanledger::{cli, commands, db};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_override = matches.get_one::<PathBuf>("db").cloned();
    let mut ledger = db::open_or_init(db_override.as_deref())?;

    match matches.subcommand() {
        Some(("init", _)) => match db_override {
            Some(p) => println!("Database initialized at {}", p.display()),
            None => println!("Database initialized at {}", db::db_path()?.display()),
        },
        Some(("loan", sub)) => commands::loans::handle(&mut ledger, sub)?,
        Some(("history", sub)) => commands::history::handle(&ledger, sub)?,
        Some(("outstanding", sub)) => commands::outstanding::handle(&ledger, sub)?,
        Some(("stats", sub)) => commands::stats::handle(&ledger, sub)?,
        Some(("report", sub)) => commands::report::handle(&ledger, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&ledger, sub)?,
        Some(("doctor", sub)) => commands::doctor::handle(&mut ledger, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
