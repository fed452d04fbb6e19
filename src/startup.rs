// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Auto-start at login via a shell link in the per-user Startup folder.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::config::LINK_NAME;
use crate::platform::CallError;

const STARTUP_SUBDIR: &str = r"Microsoft\Windows\Start Menu\Programs\Startup";
const DESCRIPTION: &str = "Re-enables package debugging for Minecraft at login";

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("APPDATA is not set; cannot locate the Startup folder")]
    NoStartupFolder,

    #[error("could not prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write startup shortcut: {0}")]
    Shortcut(#[from] CallError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// Everything needed to write one startup link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupEntry {
    pub link: PathBuf,
    pub target: PathBuf,
    pub arguments: String,
    pub working_dir: PathBuf,
    pub description: String,
}

pub trait ShortcutWriter {
    fn write(&self, entry: &StartupEntry) -> Result<(), CallError>;
}

/// `%APPDATA%\Microsoft\Windows\Start Menu\Programs\Startup`
pub fn startup_folder(appdata: Option<OsString>) -> Result<PathBuf, StartupError> {
    match appdata {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir).join(STARTUP_SUBDIR)),
        _ => Err(StartupError::NoStartupFolder),
    }
}

pub struct StartupRegistrar<W> {
    folder: PathBuf,
    writer: W,
}

impl<W: ShortcutWriter> StartupRegistrar<W> {
    pub fn new(folder: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            folder: folder.into(),
            writer,
        }
    }

    #[cfg(windows)]
    pub fn for_current_user(writer: W) -> Result<Self, StartupError> {
        Ok(Self::new(startup_folder(std::env::var_os("APPDATA"))?, writer))
    }

    pub fn link_path(&self) -> PathBuf {
        self.folder.join(LINK_NAME)
    }

    /// Points a startup link at `program` with `arguments`, started in the
    /// program's own directory. An existing link is left alone.
    pub fn register(&self, program: &Path, arguments: &str) -> Result<Registration, StartupError> {
        let link = self.link_path();
        if link.exists() {
            info!(link = %link.display(), "startup entry already present");
            return Ok(Registration::AlreadyExists(link));
        }

        fs::create_dir_all(&self.folder).map_err(|source| StartupError::Io {
            path: self.folder.clone(),
            source,
        })?;

        let entry = StartupEntry {
            link: link.clone(),
            target: program.to_path_buf(),
            arguments: arguments.to_string(),
            working_dir: program.parent().map(Path::to_path_buf).unwrap_or_default(),
            description: DESCRIPTION.to_string(),
        };
        self.writer.write(&entry)?;
        info!(link = %link.display(), target = %program.display(), "startup entry created");
        Ok(Registration::Created(link))
    }
}
