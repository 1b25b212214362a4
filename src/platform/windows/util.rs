use std::ffi::{c_void, OsStr};
use std::io;
use std::iter::once;
use std::os::windows::prelude::OsStrExt;

use windows_sys::Win32::Foundation::{BOOL, HMODULE};
use windows_sys::Win32::System::SystemServices::IMAGE_DOS_HEADER;

pub fn encode_wide(string: impl AsRef<OsStr>) -> Vec<u16> {
    string.as_ref().encode_wide().chain(once(0)).collect()
}

pub(crate) fn win_to_err(result: BOOL) -> Result<(), io::Error> {
    if result != false.into() { Ok(()) } else { Err(io::Error::last_os_error()) }
}

pub fn get_instance_handle() -> HMODULE {
    // Gets the instance handle by taking the address of the
    // pseudo-variable created by the microsoft linker:
    // https://devblogs.microsoft.com/oldnewthing/20041025-00/?p=37483

    // This is preferred over GetModuleHandle(NULL) because it also works in DLLs:
    // https://stackoverflow.com/questions/21718027/getmodulehandlenull-vs-hinstance

    extern "C" {
        static __ImageBase: IMAGE_DOS_HEADER;
    }

    unsafe { &__ImageBase as *const _ as _ }
}

/// Drivers signal a missing entry point with a handful of small sentinel values, not only null.
pub(crate) fn sanitize_proc_address(address: *const c_void) -> *const c_void {
    match address as isize {
        -1 | 0 | 1 | 2 | 3 => std::ptr::null(),
        _ => address,
    }
}
