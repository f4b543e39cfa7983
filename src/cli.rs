// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Command, arg, command};

pub fn build_cli() -> Command {
    command!()
        .name("walletwise")
        .about("Personal finance tracking service")
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP service")
                .arg(arg!(--addr <ADDR> "Listen address, e.g. 0.0.0.0:3000").required(false))
                .arg(arg!(--db <PATH> "SQLite database file").required(false)),
        )
        .subcommand(
            Command::new("init")
                .about("Create the database schema and print its location")
                .arg(arg!(--db <PATH> "SQLite database file").required(false)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_accepts_overrides() {
        let matches = build_cli().get_matches_from([
            "walletwise",
            "serve",
            "--addr",
            "127.0.0.1:8080",
            "--db",
            "/tmp/w.sqlite",
        ]);
        let Some(("serve", sub)) = matches.subcommand() else {
            panic!("serve not parsed");
        };
        assert_eq!(
            sub.get_one::<String>("addr").map(String::as_str),
            Some("127.0.0.1:8080")
        );
        assert_eq!(
            sub.get_one::<String>("db").map(String::as_str),
            Some("/tmp/w.sqlite")
        );
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(build_cli().try_get_matches_from(["walletwise", "budget"]).is_err());
    }
}
