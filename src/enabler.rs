// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Turns a package family into a concrete package and sets its debug flag.

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::platform::{PackageManager, QueryError};

/// Enables debugging for the first installed package in `family` and returns
/// that package's full name.
///
/// Packages are taken in the order the OS lists them; when a family has more
/// than one installed package only the first is touched.
pub fn enable_debugging<P>(platform: &P, family: &str) -> Result<String>
where
    P: PackageManager + ?Sized,
{
    let full_names = platform.package_full_names(family).map_err(|err| {
        warn!(family, %err, "package lookup failed");
        match err {
            QueryError::Fetch(code) => Error::PackageResolution {
                family: family.to_string(),
                code,
            },
            other => Error::PackageLookup {
                family: family.to_string(),
                code: other.code(),
            },
        }
    })?;

    let Some(package) = full_names.into_iter().next() else {
        return Err(Error::NoInstalledPackage(family.to_string()));
    };

    platform
        .enable_debugging(&package)
        .map_err(|source| Error::DebuggingEnable {
            package: package.clone(),
            source,
        })?;

    info!(family, package = %package, "debugging enabled");
    Ok(package)
}
