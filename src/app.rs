// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One run: heal stored apps, then (interactive only) scan, select, enable.

use tracing::{info, warn};

use crate::config::Settings;
use crate::enabler::enable_debugging;
use crate::error::Result;
use crate::platform::PackageManager;
use crate::scanner::Scanner;
use crate::store::AppStore;
use crate::ui::{Candidate, Frontend, Notice};

pub fn run<P, F>(
    settings: &Settings,
    platform: &P,
    frontend: &mut F,
    register: &mut dyn FnMut() -> Notice,
) -> Result<()>
where
    P: PackageManager + ?Sized,
    F: Frontend + ?Sized,
{
    let mut store = AppStore::load(&settings.store_path)?;
    info!(path = %store.path().display(), records = store.len(), "app store loaded");

    heal(&store, platform, settings.silent, frontend);
    if settings.silent {
        return Ok(());
    }

    let apps = Scanner::new(platform, &settings.prefix).scan_and_remember(&mut store)?;
    if apps.is_empty() {
        frontend.notify(&Notice::info(format!(
            "No running UWP applications starting with '{}' found.",
            settings.prefix
        )));
        return Ok(());
    }

    let candidates: Vec<Candidate> = apps
        .into_iter()
        .map(|(process_name, package_family_name)| Candidate {
            process_name,
            package_family_name,
        })
        .collect();

    let Some(family) = frontend.select(&candidates, register) else {
        frontend.notify(&Notice::info("No application selected."));
        return Ok(());
    };

    frontend.notify(&outcome_notice(enable_debugging(platform, &family)));
    Ok(())
}

/// Re-applies the fix to every stored app. Failures are only reported; the
/// next login tries again.
fn heal<P, F>(store: &AppStore, platform: &P, silent: bool, frontend: &mut F)
where
    P: PackageManager + ?Sized,
    F: Frontend + ?Sized,
{
    if store.is_empty() && silent {
        frontend.notify(&Notice::info("No stored apps to re-enable."));
    }
    for record in store.records() {
        let outcome = enable_debugging(platform, &record.package_family_name);
        if let Err(err) = &outcome {
            warn!(process = %record.process_name, %err, "self-heal failed");
        }
        if silent {
            frontend.notify(&outcome_notice(outcome));
        }
    }
}

fn outcome_notice(outcome: Result<String>) -> Notice {
    match outcome {
        Ok(package) => Notice::success(format!("Debugging enabled for package: {package}")),
        Err(err) => Notice::error(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::error::Error;
    use crate::platform::fake::FakePlatform;
    use crate::store::AppRecord;
    use crate::ui::Level;
    use tempfile::tempdir;

    const MC: &str = "Microsoft.MinecraftUWP_8wekyb3d8bbwe";
    const MC_PACKAGE: &str = "Microsoft.MinecraftUWP_1.21.4401.0_x64__8wekyb3d8bbwe";

    enum Pick {
        Index(usize),
        Dismiss,
        RegisterThenDismiss,
    }

    struct Scripted {
        pick: Pick,
        notices: Vec<Notice>,
        offered: Option<Vec<Candidate>>,
    }

    impl Scripted {
        fn new(pick: Pick) -> Self {
            Self {
                pick,
                notices: Vec::new(),
                offered: None,
            }
        }

        fn texts(&self) -> Vec<&str> {
            self.notices.iter().map(|n| n.text.as_str()).collect()
        }
    }

    impl Frontend for Scripted {
        fn notify(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }

        fn select(
            &mut self,
            candidates: &[Candidate],
            register: &mut dyn FnMut() -> Notice,
        ) -> Option<String> {
            self.offered = Some(candidates.to_vec());
            match self.pick {
                Pick::Index(i) => Some(candidates[i].package_family_name.clone()),
                Pick::Dismiss => None,
                Pick::RegisterThenDismiss => {
                    let notice = register();
                    self.notices.push(notice);
                    None
                }
            }
        }
    }

    fn settings(dir: &Path, silent: bool) -> Settings {
        Settings {
            silent,
            prefix: "M".into(),
            store_path: dir.join("apps.json"),
        }
    }

    fn no_register() -> impl FnMut() -> Notice {
        || panic!("registration not expected")
    }

    fn seed_store(dir: &Path) {
        let mut store = AppStore::load(dir.join("apps.json")).unwrap();
        store.add(AppRecord::new("Minecraft", MC)).unwrap();
    }

    #[test]
    fn nothing_running_and_nothing_stored_reports_no_apps() {
        let dir = tempdir().unwrap();
        let platform = FakePlatform::default();
        let mut ui = Scripted::new(Pick::Index(0));

        run(&settings(dir.path(), false), &platform, &mut ui, &mut no_register()).unwrap();

        assert_eq!(ui.texts(), vec!["No running UWP applications starting with 'M' found."]);
        assert!(ui.offered.is_none(), "no selection dialog expected");
    }

    #[test]
    fn silent_launch_heals_stored_app_without_scanning() {
        let dir = tempdir().unwrap();
        seed_store(dir.path());
        let platform = FakePlatform::default()
            .with_packages(MC, &[MC_PACKAGE])
            .with_process(1, "Minecraft.Windows.exe", Some(MC));
        let mut ui = Scripted::new(Pick::Dismiss);

        run(&settings(dir.path(), true), &platform, &mut ui, &mut no_register()).unwrap();

        let calls = platform.calls();
        assert_eq!(calls.iter().filter(|c| c.starts_with("full_names:")).count(), 1);
        assert_eq!(calls[0], format!("full_names:{MC}"));
        assert!(!calls.contains(&"processes".to_string()));
        assert_eq!(
            ui.texts(),
            vec![format!("Debugging enabled for package: {MC_PACKAGE}").as_str()]
        );
        assert!(ui.offered.is_none());
    }

    #[test]
    fn silent_launch_with_empty_store_says_so() {
        let dir = tempdir().unwrap();
        let platform = FakePlatform::default();
        let mut ui = Scripted::new(Pick::Dismiss);

        run(&settings(dir.path(), true), &platform, &mut ui, &mut no_register()).unwrap();

        assert_eq!(ui.texts(), vec!["No stored apps to re-enable."]);
        assert!(platform.calls().is_empty());
    }

    #[test]
    fn silent_heal_failure_is_printed_not_fatal() {
        let dir = tempdir().unwrap();
        seed_store(dir.path());
        let platform = FakePlatform::default();
        let mut ui = Scripted::new(Pick::Dismiss);

        run(&settings(dir.path(), true), &platform, &mut ui, &mut no_register()).unwrap();

        assert_eq!(ui.notices.len(), 1);
        assert_eq!(ui.notices[0].level, Level::Error);
        assert!(ui.notices[0].text.starts_with("Error searching for package"));
    }

    #[test]
    fn interactive_heals_quietly_before_scanning() {
        let dir = tempdir().unwrap();
        seed_store(dir.path());
        let platform = FakePlatform::default().with_packages(MC, &[MC_PACKAGE]);
        let mut ui = Scripted::new(Pick::Dismiss);

        run(&settings(dir.path(), false), &platform, &mut ui, &mut no_register()).unwrap();

        let calls = platform.calls();
        assert_eq!(calls[0], format!("full_names:{MC}"));
        assert_eq!(calls[1], format!("enable:{MC_PACKAGE}"));
        assert_eq!(calls[2], "processes");
        // Healing is not shown; the stored app is still offered.
        assert_eq!(ui.texts(), vec!["No application selected."]);
        let offered = ui.offered.unwrap();
        assert_eq!(offered.len(), 1);
        assert_eq!(offered[0].label(), format!("Minecraft ({MC})"));
    }

    #[test]
    fn selected_app_gets_debugging_enabled() {
        let dir = tempdir().unwrap();
        let platform = FakePlatform::default()
            .with_process(7, "Minecraft.Windows.exe", Some(MC))
            .with_process(8, "notepad.exe", None)
            .with_packages(MC, &[MC_PACKAGE]);
        let mut ui = Scripted::new(Pick::Index(0));

        run(&settings(dir.path(), false), &platform, &mut ui, &mut no_register()).unwrap();

        assert_eq!(
            ui.texts(),
            vec![format!("Debugging enabled for package: {MC_PACKAGE}").as_str()]
        );
        assert_eq!(ui.notices[0].level, Level::Success);
        assert!(platform.calls().contains(&format!("enable:{MC_PACKAGE}")));

        // The new app was remembered for the next login.
        let store = AppStore::load(dir.path().join("apps.json")).unwrap();
        assert_eq!(store.records(), &[AppRecord::new("Minecraft.Windows", MC)]);
    }

    #[test]
    fn failed_enable_is_reported_to_the_user() {
        let dir = tempdir().unwrap();
        let platform = FakePlatform::default().with_process(7, "Minecraft.Windows.exe", Some(MC));
        let mut ui = Scripted::new(Pick::Index(0));

        run(&settings(dir.path(), false), &platform, &mut ui, &mut no_register()).unwrap();

        assert_eq!(ui.notices.len(), 1);
        assert_eq!(ui.notices[0].level, Level::Error);
        assert_eq!(ui.notices[0].title(), "Error");
    }

    #[test]
    fn startup_action_runs_registrar_and_keeps_selection_open() {
        let dir = tempdir().unwrap();
        let platform = FakePlatform::default().with_process(7, "Minecraft.Windows.exe", Some(MC));
        let mut ui = Scripted::new(Pick::RegisterThenDismiss);
        let registered = Cell::new(0);
        let mut register = || {
            registered.set(registered.get() + 1);
            Notice::success("Startup entry created: Crashout Fix.lnk")
        };

        run(&settings(dir.path(), false), &platform, &mut ui, &mut register).unwrap();

        assert_eq!(registered.get(), 1);
        assert_eq!(
            ui.texts(),
            vec!["Startup entry created: Crashout Fix.lnk", "No application selected."]
        );
        assert!(!platform.calls().iter().any(|c| c.starts_with("enable:")));
    }

    #[test]
    fn corrupt_store_is_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("apps.json"), "{ not json").unwrap();
        let platform = FakePlatform::default();
        let mut ui = Scripted::new(Pick::Dismiss);

        let err = run(&settings(dir.path(), true), &platform, &mut ui, &mut no_register())
            .unwrap_err();

        assert!(matches!(err, Error::Persistence(_)));
        assert!(platform.calls().is_empty());
    }
}
