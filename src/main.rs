// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

#![cfg_attr(not(test), windows_subsystem = "windows")]
// The Win32 wiring is the only caller of parts of the core on other hosts.
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod config;
mod enabler;
mod error;
mod logging;
mod platform;
mod scanner;
mod startup;
mod store;
mod ui;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use crate::config::{Cli, Settings};
use crate::error::Result;
use crate::ui::{Frontend, Notice};

fn main() -> ExitCode {
    let settings: Settings = Cli::parse().into();

    let log_dir = settings
        .store_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    logging::init(log_dir);
    info!(silent = settings.silent, prefix = %settings.prefix, "=== crashout-fix START ===");

    let mut frontend = ui::frontend(settings.silent);
    let code = match launch(&settings, frontend.as_mut()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "run failed");
            frontend.notify(&Notice::error(err.to_string()));
            ExitCode::FAILURE
        }
    };
    info!("=== crashout-fix EXIT ===");
    code
}

#[cfg(windows)]
fn launch(settings: &Settings, frontend: &mut dyn Frontend) -> Result<()> {
    use crate::config::SILENT_FLAG;
    use crate::error::Error;
    use crate::platform::win32::{ComApartment, ShellLinkWriter, Win32Packages};
    use crate::startup::StartupRegistrar;

    let _com = ComApartment::init().map_err(Error::ComInit)?;

    let mut register = || -> Notice {
        let outcome = std::env::current_exe()
            .map_err(|source| crate::startup::StartupError::Io {
                path: "current executable".into(),
                source,
            })
            .and_then(|exe| {
                StartupRegistrar::for_current_user(ShellLinkWriter)?.register(&exe, SILENT_FLAG)
            });
        outcome.into()
    };

    app::run(settings, &Win32Packages, frontend, &mut register)
}

#[cfg(not(windows))]
fn launch(_settings: &Settings, _frontend: &mut dyn Frontend) -> Result<()> {
    Err(crate::error::Error::Unsupported)
}
