// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, ArgGroup, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn required(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).required(true).help(help)
}

pub fn build_cli() -> Command {
    Command::new("loanledger")
        .version(clap::crate_version!())
        .about("Peer-to-peer loan ledger")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_parser(value_parser!(std::path::PathBuf))
                .help("Database file (default: $LOANLEDGER_DB or the platform data dir)"),
        )
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("loan")
                .about("Record and update loans")
                .subcommand(
                    Command::new("create")
                        .about("Record a new loan")
                        .arg(Arg::new("id").long("id").help("Loan id (generated if omitted)"))
                        .arg(required("lender", "Lending user"))
                        .arg(required("borrower", "Borrowing user"))
                        .arg(required("amount", "Amount lent"))
                        .arg(required("currency", "Three-letter currency code"))
                        .arg(required("thread", "Reference to where the loan was arranged")),
                )
                .subcommand(
                    Command::new("repay")
                        .about("Record a repayment")
                        .arg(required("id", "Loan id"))
                        .arg(required("amount", "Amount repaid"))
                        .arg(
                            Arg::new("currency")
                                .long("currency")
                                .help("Reject the repayment unless the loan is in this currency"),
                        ),
                )
                .subcommand(
                    Command::new("confirm")
                        .about("Mark an active loan as confirmed by the borrower")
                        .arg(required("id", "Loan id")),
                )
                .subcommand(
                    Command::new("refund")
                        .about("Mark a loan as refunded, by id or by its terms")
                        .arg(Arg::new("id").long("id").help("Loan id"))
                        .arg(Arg::new("lender").long("lender"))
                        .arg(Arg::new("borrower").long("borrower"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("currency").long("currency"))
                        .group(
                            ArgGroup::new("by_terms")
                                .args(["lender", "borrower", "amount", "currency"])
                                .multiple(true)
                                .conflicts_with("id"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("show")
                        .about("Show one loan")
                        .arg(required("id", "Loan id")),
                )),
        )
        .subcommand(json_flags(
            Command::new("history")
                .about("Loans naming a user, newest first")
                .arg(Arg::new("username").required(true))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(json_flags(
            Command::new("outstanding").about("Loans not yet repaid or refunded, oldest first"),
        ))
        .subcommand(json_flags(
            Command::new("stats")
                .about("A user's aggregate")
                .arg(Arg::new("username").required(true)),
        ))
        .subcommand(json_flags(
            Command::new("report")
                .about("A user's aggregate and open loans")
                .arg(Arg::new("username").required(true))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize))
                        .default_value("5"),
                ),
        ))
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("loans")
                    .about("Export all loans")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .help("csv | json"),
                    )
                    .arg(required("out", "Output path")),
            ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check loans and stats for consistency")
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .action(ArgAction::SetTrue)
                        .help("Rebuild stats from loans before reporting"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }
}
