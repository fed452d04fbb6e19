// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Win32 implementation of the platform seam: process table, AppModel package
//! queries, `IPackageDebugSettings` and shell links.

use std::ffi::OsStr;
use std::iter;
use std::os::windows::ffi::OsStrExt;

use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, trace};
use windows::core::{Interface, GUID, HRESULT, PCWSTR, PWSTR};
use windows::Win32::Foundation::{CloseHandle, FALSE, TRUE};
use windows::Win32::Storage::Packaging::Appx::{GetPackageFamilyName, GetPackagesByPackageFamily};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, IPersistFile, CLSCTX_ALL,
    CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED,
};
use windows::Win32::System::Console::{AttachConsole, ATTACH_PARENT_PROCESS};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_QUERY_LIMITED_INFORMATION};
use windows::Win32::UI::Shell::IShellLinkW;
use windows_core::{interface, IUnknown, IUnknown_Vtbl};

use super::{
    length_then_fetch, CallError, PackageManager, ProcessInfo, QueryError, ERROR_SUCCESS,
};
use crate::startup::{ShortcutWriter, StartupEntry};

// CLSID_PackageDebugSettings = {B1AEC16F-2383-4852-B0E9-8F0B1DC66B4D}
const PACKAGE_DEBUG_SETTINGS: GUID = GUID::from_u128(0xb1aec16f_2383_4852_b0e9_8f0b1dc66b4d);
// CLSID_ShellLink = {00021401-0000-0000-C000-000000000046}
const SHELL_LINK: GUID = GUID::from_u128(0x00021401_0000_0000_c000_000000000046);

// Only the first vtable slot is called.
#[interface("F27C3930-8029-4AD1-94E3-3DBA417810C1")]
unsafe trait IPackageDebugSettings: IUnknown {
    fn EnableDebugging(
        &self,
        package_full_name: PCWSTR,
        debugger_command_line: PCWSTR,
        environment: *const u16,
    ) -> HRESULT;
}

impl From<windows::core::Error> for CallError {
    fn from(e: windows::core::Error) -> Self {
        Self {
            code: e.code().0 as u32,
            message: e.message().to_string(),
        }
    }
}

pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(iter::once(0)).collect()
}

fn wide_os(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(iter::once(0)).collect()
}

fn from_wide(buf: &[u16]) -> String {
    String::from_utf16_lossy(buf).trim_end_matches('\0').to_string()
}

/// Single-threaded COM apartment for the lifetime of the guard.
pub struct ComApartment;

impl ComApartment {
    pub fn init() -> Result<Self, CallError> {
        unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED) }.ok()?;
        debug!("COM initialized");
        Ok(Self)
    }
}

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// Lets `--silent` status lines reach the terminal we were started from.
/// Does nothing when launched from Explorer or the Startup folder.
pub fn attach_parent_console() {
    let _ = unsafe { AttachConsole(ATTACH_PARENT_PROCESS) };
}

#[derive(Debug, Default)]
pub struct Win32Packages;

impl PackageManager for Win32Packages {
    fn processes(&self) -> Vec<ProcessInfo> {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);
        let processes: Vec<ProcessInfo> = system
            .processes()
            .iter()
            .map(|(pid, p)| ProcessInfo {
                pid: pid.as_u32(),
                name: p.name().to_string_lossy().into_owned(),
            })
            .collect();
        trace!(count = processes.len(), "process table read");
        processes
    }

    fn package_family_name(&self, pid: u32) -> Result<String, QueryError> {
        let process = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, FALSE, pid) }
            .map_err(|e| QueryError::Access(e.code().0 as u32))?;

        let family = length_then_fetch(
            |len: &mut u32| unsafe { GetPackageFamilyName(process, len, PWSTR::null()).0 },
            |len| {
                let mut buf = vec![0u16; *len as usize];
                let status =
                    unsafe { GetPackageFamilyName(process, len, PWSTR(buf.as_mut_ptr())).0 };
                if status == ERROR_SUCCESS {
                    Ok(from_wide(&buf))
                } else {
                    Err(status)
                }
            },
        );

        let _ = unsafe { CloseHandle(process) };
        family
    }

    fn package_full_names(&self, family: &str) -> Result<Vec<String>, QueryError> {
        let family_w = wide(family);
        let family_name = PCWSTR(family_w.as_ptr());

        // lengths = (package count, character buffer length)
        length_then_fetch(
            |lengths: &mut (u32, u32)| unsafe {
                GetPackagesByPackageFamily(
                    family_name,
                    &mut lengths.0,
                    None,
                    &mut lengths.1,
                    PWSTR::null(),
                )
                .0
            },
            |lengths| {
                let mut full_names = vec![PWSTR::null(); lengths.0 as usize];
                let mut buffer = vec![0u16; lengths.1 as usize];
                let status = unsafe {
                    GetPackagesByPackageFamily(
                        family_name,
                        &mut lengths.0,
                        Some(full_names.as_mut_ptr()),
                        &mut lengths.1,
                        PWSTR(buffer.as_mut_ptr()),
                    )
                    .0
                };
                if status != ERROR_SUCCESS {
                    return Err(status);
                }
                // The pointers index into `buffer`, which is still alive here.
                Ok(full_names
                    .iter()
                    .take(lengths.0 as usize)
                    .filter_map(|name| unsafe { name.to_string() }.ok())
                    .collect())
            },
        )
    }

    fn enable_debugging(&self, package_full_name: &str) -> Result<(), CallError> {
        // Released when `settings` drops, on every path out of here.
        let settings: IPackageDebugSettings =
            unsafe { CoCreateInstance(&PACKAGE_DEBUG_SETTINGS, None, CLSCTX_ALL) }?;
        let name = wide(package_full_name);
        unsafe {
            settings.EnableDebugging(PCWSTR(name.as_ptr()), PCWSTR::null(), std::ptr::null())
        }
        .ok()?;
        Ok(())
    }
}

/// Writes `.lnk` files through `IShellLinkW` + `IPersistFile`.
#[derive(Debug, Default)]
pub struct ShellLinkWriter;

impl ShortcutWriter for ShellLinkWriter {
    fn write(&self, entry: &StartupEntry) -> Result<(), CallError> {
        let target = wide_os(entry.target.as_os_str());
        let arguments = wide(&entry.arguments);
        let working_dir = wide_os(entry.working_dir.as_os_str());
        let description = wide(&entry.description);
        let link_path = wide_os(entry.link.as_os_str());

        unsafe {
            let link: IShellLinkW = CoCreateInstance(&SHELL_LINK, None, CLSCTX_INPROC_SERVER)?;
            link.SetPath(PCWSTR(target.as_ptr()))?;
            link.SetArguments(PCWSTR(arguments.as_ptr()))?;
            link.SetWorkingDirectory(PCWSTR(working_dir.as_ptr()))?;
            link.SetDescription(PCWSTR(description.as_ptr()))?;

            let persist: IPersistFile = link.cast()?;
            persist.Save(PCWSTR(link_path.as_ptr()), TRUE)?;
        }
        debug!(link = %entry.link.display(), "shell link saved");
        Ok(())
    }
}
