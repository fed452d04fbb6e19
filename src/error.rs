// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use thiserror::Error;

use crate::platform::CallError;
use crate::startup::StartupError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error searching for package {family}. Error code: {code}")]
    PackageLookup { family: String, code: u32 },

    #[error("Error getting package details for {family}. Error code: {code}")]
    PackageResolution { family: String, code: u32 },

    #[error("No installed package found for {0}")]
    NoInstalledPackage(String),

    #[error("Error enabling debugging for {package}: {source}")]
    DebuggingEnable {
        package: String,
        #[source]
        source: CallError,
    },

    #[error(transparent)]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("COM initialization failed: {0}")]
    ComInit(CallError),

    #[cfg_attr(windows, allow(dead_code))]
    #[error("crashout-fix only runs on Windows")]
    Unsupported,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
