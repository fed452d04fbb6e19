// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! How results reach the user: Win32 dialogs when interactive, stdout when
//! running silently from the Startup folder.

#[cfg(windows)]
pub mod dialog;

use tracing::warn;

use crate::startup::{Registration, StartupError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: Level::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { level: Level::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: Level::Error, text: text.into() }
    }

    pub fn title(&self) -> &'static str {
        match self.level {
            Level::Info => "Information",
            Level::Success => "Success",
            Level::Error => "Error",
        }
    }
}

impl From<Result<Registration, StartupError>> for Notice {
    fn from(outcome: Result<Registration, StartupError>) -> Self {
        match outcome {
            Ok(Registration::Created(link)) => {
                Notice::success(format!("Startup entry created: {}", link.display()))
            }
            Ok(Registration::AlreadyExists(link)) => {
                Notice::info(format!("Startup entry already exists: {}", link.display()))
            }
            Err(err) => Notice::error(format!("Could not register at startup: {err}")),
        }
    }
}

/// One row in the selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub process_name: String,
    pub package_family_name: String,
}

impl Candidate {
    pub fn label(&self) -> String {
        format!("{} ({})", self.process_name, self.package_family_name)
    }
}

pub trait Frontend {
    fn notify(&mut self, notice: &Notice);

    /// Lets the user pick one candidate and returns its package family, or
    /// `None` if the choice was dismissed. `register` runs the startup
    /// registration; the frontend shows its notice and keeps the choice open.
    fn select(
        &mut self,
        candidates: &[Candidate],
        register: &mut dyn FnMut() -> Notice,
    ) -> Option<String>;
}

/// Silent mode: one line per notice on stdout, no selection.
#[derive(Debug, Default)]
pub struct Console;

impl Frontend for Console {
    fn notify(&mut self, notice: &Notice) {
        match notice.level {
            Level::Error => println!("error: {}", notice.text),
            _ => println!("{}", notice.text),
        }
    }

    fn select(&mut self, candidates: &[Candidate], _: &mut dyn FnMut() -> Notice) -> Option<String> {
        warn!(count = candidates.len(), "selection requested without a dialog");
        None
    }
}

#[cfg(windows)]
pub fn frontend(silent: bool) -> Box<dyn Frontend> {
    if silent {
        crate::platform::win32::attach_parent_console();
        Box::new(Console)
    } else {
        Box::new(dialog::Dialogs)
    }
}

#[cfg(not(windows))]
pub fn frontend(_silent: bool) -> Box<dyn Frontend> {
    Box::new(Console)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn candidate_label_shows_process_and_family() {
        let candidate = Candidate {
            process_name: "Minecraft.Windows".into(),
            package_family_name: "Microsoft.MinecraftUWP_8wekyb3d8bbwe".into(),
        };
        assert_eq!(
            candidate.label(),
            "Minecraft.Windows (Microsoft.MinecraftUWP_8wekyb3d8bbwe)"
        );
    }

    #[test]
    fn registration_outcomes_become_notices() {
        let created: Notice = Ok(Registration::Created(PathBuf::from("Crashout Fix.lnk"))).into();
        assert_eq!(created.level, Level::Success);
        assert_eq!(created.text, "Startup entry created: Crashout Fix.lnk");

        let existing: Notice = Ok(Registration::AlreadyExists(PathBuf::from("x.lnk"))).into();
        assert_eq!(existing.level, Level::Info);

        let failed: Notice = Err(StartupError::NoStartupFolder).into();
        assert_eq!(failed.level, Level::Error);
        assert_eq!(failed.title(), "Error");
    }

    #[test]
    fn console_never_selects() {
        let candidates = vec![Candidate {
            process_name: "Minecraft".into(),
            package_family_name: "Microsoft.MinecraftUWP_8wekyb3d8bbwe".into(),
        }];
        let mut registered = false;
        let picked = Console.select(&candidates, &mut || {
            registered = true;
            Notice::info("")
        });
        assert_eq!(picked, None);
        assert!(!registered);
    }
}
