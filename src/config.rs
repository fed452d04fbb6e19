// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::PathBuf;

use clap::Parser;

// ── Fixed names ─────────────────────────────────────
pub const STORE_FILE: &str = "apps.json"; // Previously targeted packages
pub const LOG_FILE_PREFIX: &str = "crashout-fix"; // -> crashout-fix.log
pub const LINK_NAME: &str = "Crashout Fix.lnk"; // Startup folder entry
pub const SILENT_FLAG: &str = "--silent"; // Passed by the startup entry
pub const DEFAULT_PREFIX: &str = "M";

/// Re-enable package debugging for running UWP apps (Minecraft crash loop fix).
#[derive(Debug, Parser)]
#[command(name = "crashout-fix", version, about)]
pub struct Cli {
    /// Re-apply the fix for stored apps only; no dialogs, status goes to stdout
    #[arg(long)]
    pub silent: bool,

    /// Only processes whose name starts with this prefix are offered
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Where previously targeted apps are remembered
    #[arg(long, default_value = STORE_FILE)]
    pub store: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub silent: bool,
    pub prefix: String,
    pub store_path: PathBuf,
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        Self {
            silent: cli.silent,
            prefix: cli.prefix,
            store_path: cli.store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Settings {
        Cli::try_parse_from(std::iter::once("crashout-fix").chain(args.iter().copied()))
            .expect("arguments should parse")
            .into()
    }

    #[test]
    fn no_arguments_is_interactive_with_defaults() {
        let settings = parse(&[]);
        assert!(!settings.silent);
        assert_eq!(settings.prefix, "M");
        assert_eq!(settings.store_path, PathBuf::from("apps.json"));
    }

    #[test]
    fn silent_flag_matches_startup_argument() {
        let settings = parse(&[SILENT_FLAG]);
        assert!(settings.silent);
    }

    #[test]
    fn prefix_and_store_can_be_overridden() {
        let settings = parse(&["--prefix", "Mine", "--store", "other.json"]);
        assert_eq!(settings.prefix, "Mine");
        assert_eq!(settings.store_path, PathBuf::from("other.json"));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["crashout-fix", "--loud"]).is_err());
    }
}
