// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Remembers which packages were targeted before, so the fix can be
//! re-applied at every login without asking.
//!
//! On disk this is a pretty-printed JSON array, one object per app with the
//! tags `ProcessName` and `PackageFamilyName`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access app store {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("app store {} is corrupt: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppRecord {
    pub process_name: String,
    pub package_family_name: String,
}

impl AppRecord {
    pub fn new(process_name: impl Into<String>, package_family_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            package_family_name: package_family_name.into(),
        }
    }
}

#[derive(Debug)]
pub struct AppStore {
    path: PathBuf,
    records: Vec<AppRecord>,
}

impl AppStore {
    /// Loads the store at `path`. A missing or blank file is an empty store;
    /// anything that does not parse is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no app store yet");
                Vec::new()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> &[AppRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, record: &AppRecord) -> bool {
        self.records.contains(record)
    }

    /// Appends `record` and saves. Returns `false` without touching the file
    /// when the same (process, family) pair is already stored.
    pub fn add(&mut self, record: AppRecord) -> Result<bool, StoreError> {
        if self.contains(&record) {
            return Ok(false);
        }
        info!(
            process = %record.process_name,
            family = %record.package_family_name,
            "remembering app"
        );
        self.records.push(record);
        self.save()?;
        Ok(true)
    }

    /// Overwrites the file with the full current list.
    pub fn save(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.records).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, json + "\n").map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
