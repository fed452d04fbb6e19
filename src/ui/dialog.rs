// Crashout Fix: re-enables package debugging for Minecraft (UWP)
// Copyright (C) 2026  Martin Gehrken (IamLumae)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::cell::RefCell;
use std::ffi::c_void;
use std::mem;

use tracing::{debug, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, GetSysColorBrush, COLOR_BTNFACE, DEFAULT_GUI_FONT};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::SetFocus;
use windows::Win32::UI::WindowsAndMessaging::*;

use super::{Candidate, Frontend, Level, Notice};
use crate::platform::win32::wide;

// ── Control IDs ─────────────────────────────────────
const ID_ENABLE: i32 = 1; // IDOK: Enter confirms
const ID_CANCEL: i32 = 2; // IDCANCEL: Esc dismisses
const ID_STARTUP: i32 = 100;
const ID_LIST: i32 = 101;

// ── Listbox / button bits ───────────────────────────
const LBS_NOTIFY: u32 = 0x0001;
const LB_ADDSTRING: u32 = 0x0180;
const LB_GETCURSEL: u32 = 0x0188;
const LBN_DBLCLK: u32 = 2;
const BS_DEFPUSHBUTTON: u32 = 0x0001;

// ── Layout ──────────────────────────────────────────
const DLG_W: i32 = 380;
const DLG_H: i32 = 300;
const MARGIN: i32 = 10;
const BTN_H: i32 = 28;
const BTN_W: i32 = 140;

#[derive(Default)]
struct DialogState {
    list: HWND,
    chosen: Option<usize>,
    register_requested: bool,
}

thread_local! {
    static STATE: RefCell<DialogState> = RefCell::new(DialogState::default());
}

/// Interactive mode: message boxes and the app selection window.
#[derive(Debug, Default)]
pub struct Dialogs;

impl Frontend for Dialogs {
    fn notify(&mut self, notice: &Notice) {
        message_box(HWND::default(), notice);
    }

    fn select(
        &mut self,
        candidates: &[Candidate],
        register: &mut dyn FnMut() -> Notice,
    ) -> Option<String> {
        if candidates.is_empty() {
            return None;
        }
        match unsafe { run_selection(candidates, register) } {
            Ok(index) => index
                .and_then(|i| candidates.get(i))
                .map(|c| c.package_family_name.clone()),
            Err(e) => {
                warn!(error = %e, "selection window failed");
                message_box(
                    HWND::default(),
                    &Notice::error(format!("Could not show the selection window: {e}")),
                );
                None
            }
        }
    }
}

fn message_box(owner: HWND, notice: &Notice) {
    let text = wide(&notice.text);
    let title = wide(notice.title());
    let icon = match notice.level {
        Level::Error => MB_ICONERROR,
        Level::Info | Level::Success => MB_ICONINFORMATION,
    };
    unsafe {
        MessageBoxW(owner, PCWSTR(text.as_ptr()), PCWSTR(title.as_ptr()), MB_OK | icon);
    }
}

unsafe fn run_selection(
    candidates: &[Candidate],
    register: &mut dyn FnMut() -> Notice,
) -> windows::core::Result<Option<usize>> {
    let instance: HINSTANCE = GetModuleHandleW(None)?.into();
    let class = w!("CrashoutFixSelect");

    let wc = WNDCLASSEXW {
        cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(dialog_proc),
        hInstance: instance,
        hCursor: LoadCursorW(None, IDC_ARROW)?,
        hbrBackground: GetSysColorBrush(COLOR_BTNFACE),
        lpszClassName: class,
        ..Default::default()
    };
    // Fails harmlessly if the class is already registered.
    RegisterClassExW(&wc);

    let x = (GetSystemMetrics(SM_CXSCREEN) - DLG_W) / 2;
    let y = (GetSystemMetrics(SM_CYSCREEN) - DLG_H) / 2;
    let hwnd = CreateWindowExW(
        WS_EX_DLGMODALFRAME,
        class,
        w!("Select UWP Application"),
        WS_CAPTION | WS_SYSMENU,
        x, y, DLG_W, DLG_H,
        HWND::default(), HMENU::default(), instance, None,
    )?;

    let mut rc = RECT::default();
    GetClientRect(hwnd, &mut rc)?;
    let (cw, ch) = (rc.right - rc.left, rc.bottom - rc.top);
    let btn_y = ch - MARGIN - BTN_H;

    let list = child(
        hwnd, instance, w!("LISTBOX"), PCWSTR::null(),
        WS_BORDER | WS_VSCROLL | WINDOW_STYLE(LBS_NOTIFY),
        ID_LIST,
        (MARGIN, MARGIN, cw - 2 * MARGIN, btn_y - 2 * MARGIN),
    )?;
    child(
        hwnd, instance, w!("BUTTON"), w!("Run at Startup"),
        WINDOW_STYLE::default(),
        ID_STARTUP,
        (MARGIN, btn_y, BTN_W, BTN_H),
    )?;
    child(
        hwnd, instance, w!("BUTTON"), w!("Enable Debugging"),
        WINDOW_STYLE(BS_DEFPUSHBUTTON),
        ID_ENABLE,
        (cw - MARGIN - BTN_W, btn_y, BTN_W, BTN_H),
    )?;

    for candidate in candidates {
        let label = wide(&candidate.label());
        SendMessageW(list, LB_ADDSTRING, WPARAM(0), LPARAM(label.as_ptr() as isize));
    }

    STATE.with(|s| {
        *s.borrow_mut() = DialogState {
            list,
            ..Default::default()
        }
    });

    let _ = ShowWindow(hwnd, SW_SHOW);
    let _ = SetForegroundWindow(hwnd);
    let _ = SetFocus(list);
    debug!(count = candidates.len(), "selection window shown");

    let mut msg = MSG::default();
    while GetMessageW(&mut msg, None, 0, 0).into() {
        if !IsDialogMessageW(hwnd, &msg).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
        // Registration runs here, outside the window procedure, and the
        // window stays open.
        let requested = STATE.with(|s| mem::take(&mut s.borrow_mut().register_requested));
        if requested {
            let notice = register();
            message_box(hwnd, &notice);
        }
    }

    Ok(STATE.with(|s| s.borrow_mut().chosen.take()))
}

unsafe fn child(
    parent: HWND,
    instance: HINSTANCE,
    class: PCWSTR,
    text: PCWSTR,
    style: WINDOW_STYLE,
    id: i32,
    (x, y, w, h): (i32, i32, i32, i32),
) -> windows::core::Result<HWND> {
    let hwnd = CreateWindowExW(
        WINDOW_EX_STYLE::default(),
        class,
        text,
        WS_CHILD | WS_VISIBLE | WS_TABSTOP | style,
        x, y, w, h,
        parent,
        HMENU(id as usize as *mut c_void),
        instance,
        None,
    )?;
    let font = GetStockObject(DEFAULT_GUI_FONT);
    SendMessageW(hwnd, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
    Ok(hwnd)
}

unsafe fn confirm(hwnd: HWND) {
    let list = STATE.with(|s| s.borrow().list);
    let selected = SendMessageW(list, LB_GETCURSEL, WPARAM(0), LPARAM(0)).0;
    // LB_ERR (-1) when nothing is highlighted
    STATE.with(|s| s.borrow_mut().chosen = usize::try_from(selected).ok());
    let _ = DestroyWindow(hwnd);
}

unsafe extern "system" fn dialog_proc(hwnd: HWND, msg: u32, wp: WPARAM, lp: LPARAM) -> LRESULT {
    match msg {
        WM_COMMAND => {
            let id = (wp.0 & 0xFFFF) as i32;
            let code = ((wp.0 >> 16) & 0xFFFF) as u32;
            match id {
                ID_ENABLE => confirm(hwnd),
                ID_LIST if code == LBN_DBLCLK => confirm(hwnd),
                ID_STARTUP => STATE.with(|s| s.borrow_mut().register_requested = true),
                ID_CANCEL => {
                    let _ = DestroyWindow(hwnd);
                }
                _ => {}
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wp, lp),
    }
}
