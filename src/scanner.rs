// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Finds running packaged apps whose process name starts with a prefix.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::platform::PackageManager;
use crate::store::{AppRecord, AppStore, StoreError};

/// process name -> package family name
pub type AppMap = BTreeMap<String, String>;

pub struct Scanner<'a, P: ?Sized> {
    platform: &'a P,
    prefix: String,
}

impl<'a, P> Scanner<'a, P>
where
    P: PackageManager + ?Sized,
{
    pub fn new(platform: &'a P, prefix: &str) -> Self {
        Self {
            platform,
            prefix: prefix.to_lowercase(),
        }
    }

    fn matches(&self, process_name: &str) -> bool {
        process_name.to_lowercase().starts_with(&self.prefix)
    }

    /// Best-effort: a process that cannot be opened or has no package is
    /// skipped, never fatal.
    pub fn scan(&self) -> AppMap {
        let mut apps = AppMap::new();
        for process in self.platform.processes() {
            let name = process_name(&process.name);
            if !self.matches(name) {
                continue;
            }
            match self.platform.package_family_name(process.pid) {
                Ok(family) if !family.is_empty() => {
                    trace!(pid = process.pid, name, family = %family, "packaged app");
                    apps.insert(name.to_string(), family);
                }
                Ok(_) => {}
                Err(err) => trace!(pid = process.pid, name, %err, "skipped"),
            }
        }
        debug!(prefix = %self.prefix, found = apps.len(), "scan finished");
        apps
    }

    /// Scans, stores any new (process, family) pairs, and returns the stored
    /// apps overlaid with what is running right now.
    pub fn scan_and_remember(&self, store: &mut AppStore) -> Result<AppMap, StoreError> {
        let live = self.scan();
        for (name, family) in &live {
            store.add(AppRecord::new(name.as_str(), family.as_str()))?;
        }

        let mut merged: AppMap = store
            .records()
            .iter()
            .map(|r| (r.process_name.clone(), r.package_family_name.clone()))
            .collect();
        merged.extend(live);
        Ok(merged)
    }
}

/// `Minecraft.Windows.exe` -> `Minecraft.Windows`
fn process_name(image: &str) -> &str {
    let len = image.len();
    if len > 4 && image.is_char_boundary(len - 4) && image[len - 4..].eq_ignore_ascii_case(".exe") {
        &image[..len - 4]
    } else {
        image
    }
}
