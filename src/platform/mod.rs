// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The OS services this tool consumes, behind one trait.

#[cfg(windows)]
pub mod win32;

use thiserror::Error;

pub const ERROR_SUCCESS: u32 = 0;
pub const ERROR_INSUFFICIENT_BUFFER: u32 = 122;

/// A live OS process as reported by the process table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    /// Image name, e.g. `Minecraft.Windows.exe`
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The length query did not report `ERROR_INSUFFICIENT_BUFFER`.
    #[error("length query returned error code {0}")]
    Sizing(u32),

    #[error("fetch returned error code {0}")]
    Fetch(u32),

    #[error("process could not be opened (0x{0:08X})")]
    Access(u32),
}

impl QueryError {
    pub fn code(&self) -> u32 {
        match *self {
            Self::Sizing(code) | Self::Fetch(code) | Self::Access(code) => code,
        }
    }
}

/// A failed COM or Win32 call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (0x{code:08X})")]
pub struct CallError {
    pub code: u32,
    pub message: String,
}

pub trait PackageManager {
    fn processes(&self) -> Vec<ProcessInfo>;

    /// Package family of a running process. Unpackaged processes fail with
    /// `QueryError::Sizing(APPMODEL_ERROR_NO_PACKAGE)`.
    fn package_family_name(&self, pid: u32) -> Result<String, QueryError>;

    /// All installed full package names in `family`, in OS order.
    fn package_full_names(&self, family: &str) -> Result<Vec<String>, QueryError>;

    /// Flips the debug-enabled flag for `package_full_name`. No debugger is
    /// attached and no environment is passed.
    fn enable_debugging(&self, package_full_name: &str) -> Result<(), CallError>;
}

/// Win32 "ask for the length, then fetch" convention.
///
/// `size` makes the first call with no buffer and fills in the required
/// lengths. `fetch` runs only if that call reported
/// `ERROR_INSUFFICIENT_BUFFER`; it gets the same lengths and returns either the
/// value or the status code of the second call.
pub fn length_then_fetch<L, T>(
    size: impl FnOnce(&mut L) -> u32,
    fetch: impl FnOnce(&mut L) -> Result<T, u32>,
) -> Result<T, QueryError>
where
    L: Default,
{
    let mut lengths = L::default();
    let status = size(&mut lengths);
    if status != ERROR_INSUFFICIENT_BUFFER {
        return Err(QueryError::Sizing(status));
    }
    fetch(&mut lengths).map_err(QueryError::Fetch)
}

/// In-memory platform that records every call, for tests.
#[cfg(test)]
pub mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    pub const APPMODEL_ERROR_NO_PACKAGE: u32 = 15700;
    pub const ERROR_NOT_FOUND: u32 = 1168;

    #[derive(Default)]
    pub struct FakePlatform {
        pub processes: Vec<ProcessInfo>,
        pub families: HashMap<u32, Result<String, QueryError>>,
        pub packages: HashMap<String, Result<Vec<String>, QueryError>>,
        pub enable_failure: Option<CallError>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakePlatform {
        /// Adds a running process; `family` of `None` means unpackaged.
        pub fn with_process(mut self, pid: u32, name: &str, family: Option<&str>) -> Self {
            self.processes.push(ProcessInfo {
                pid,
                name: name.to_string(),
            });
            let family = match family {
                Some(f) => Ok(f.to_string()),
                None => Err(QueryError::Sizing(APPMODEL_ERROR_NO_PACKAGE)),
            };
            self.families.insert(pid, family);
            self
        }

        pub fn with_packages(mut self, family: &str, full_names: &[&str]) -> Self {
            self.packages.insert(
                family.to_string(),
                Ok(full_names.iter().map(|n| n.to_string()).collect()),
            );
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl PackageManager for FakePlatform {
        fn processes(&self) -> Vec<ProcessInfo> {
            self.record("processes".into());
            self.processes.clone()
        }

        fn package_family_name(&self, pid: u32) -> Result<String, QueryError> {
            self.record(format!("family:{pid}"));
            self.families
                .get(&pid)
                .cloned()
                .unwrap_or(Err(QueryError::Access(0x8007_0005)))
        }

        fn package_full_names(&self, family: &str) -> Result<Vec<String>, QueryError> {
            self.record(format!("full_names:{family}"));
            self.packages
                .get(family)
                .cloned()
                .unwrap_or(Err(QueryError::Sizing(ERROR_NOT_FOUND)))
        }

        fn enable_debugging(&self, package_full_name: &str) -> Result<(), CallError> {
            self.record(format!("enable:{package_full_name}"));
            match &self.enable_failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn fetch_runs_after_insufficient_buffer() {
        let fetched = Cell::new(0);
        let result = length_then_fetch(
            |len: &mut u32| {
                *len = 5;
                ERROR_INSUFFICIENT_BUFFER
            },
            |len| {
                fetched.set(fetched.get() + 1);
                Ok(vec![0u16; *len as usize])
            },
        );
        assert_eq!(result.unwrap().len(), 5);
        assert_eq!(fetched.get(), 1);
    }

    #[test]
    fn other_sizing_results_skip_the_fetch() {
        // Success on the length query is not expected and also short-circuits.
        for status in [ERROR_SUCCESS, 5, fake::APPMODEL_ERROR_NO_PACKAGE, fake::ERROR_NOT_FOUND] {
            let fetched = Cell::new(false);
            let result: Result<(), _> = length_then_fetch(
                |_: &mut u32| status,
                |_| {
                    fetched.set(true);
                    Ok(())
                },
            );
            assert_eq!(result, Err(QueryError::Sizing(status)));
            assert!(!fetched.get(), "fetch ran after status {status}");
        }
    }

    #[test]
    fn fetch_failure_is_reported_separately() {
        let result: Result<String, _> = length_then_fetch(
            |lengths: &mut (u32, u32)| {
                *lengths = (1, 64);
                ERROR_INSUFFICIENT_BUFFER
            },
            |lengths| {
                assert_eq!(*lengths, (1, 64));
                Err(ERROR_INSUFFICIENT_BUFFER)
            },
        );
        assert_eq!(result, Err(QueryError::Fetch(ERROR_INSUFFICIENT_BUFFER)));
        assert_eq!(result.unwrap_err().code(), ERROR_INSUFFICIENT_BUFFER);
    }

    #[test]
    fn call_error_shows_hresult() {
        let err = CallError {
            code: 0x8007_0005,
            message: "Access is denied.".into(),
        };
        assert_eq!(err.to_string(), "Access is denied. (0x80070005)");
    }
}
