use std::sync::OnceLock;
use std::{io, ptr};

use tracing::debug;
use windows_sys::Win32::Foundation::{ERROR_CLASS_ALREADY_EXISTS, HWND};
use windows_sys::Win32::Graphics::Gdi::{GetDC, ReleaseDC, HDC};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, RegisterClassW, CS_OWNDC, WNDCLASSW,
};

use super::util;
use crate::descriptor::DESCRIPTOR;
use crate::error::OsError;

static CLASS_NAME: OnceLock<Vec<u16>> = OnceLock::new();

/// Registers the window class shared by every hidden window of the process.
///
/// Only a successful registration is remembered; after a failure the next call tries again.
fn register_class() -> Result<&'static [u16], OsError> {
    register_with(&CLASS_NAME, |class_name| {
        let class = WNDCLASSW {
            style: CS_OWNDC,
            lpfnWndProc: Some(DefWindowProcW),
            cbClsExtra: 0,
            cbWndExtra: 0,
            hInstance: util::get_instance_handle(),
            hIcon: ptr::null_mut(),
            hCursor: ptr::null_mut(),
            hbrBackground: ptr::null_mut(),
            lpszMenuName: ptr::null(),
            lpszClassName: class_name.as_ptr(),
        };

        if unsafe { RegisterClassW(&class) } == 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    })
}

fn register_with<'a, F>(cell: &'a OnceLock<Vec<u16>>, register: F) -> Result<&'a [u16], OsError>
where
    F: FnOnce(&[u16]) -> io::Result<()>,
{
    if let Some(class_name) = cell.get() {
        return Ok(class_name);
    }

    let class_name = util::encode_wide(DESCRIPTOR.name);
    match register(&class_name) {
        Ok(()) => debug!("registered window class `{}`", DESCRIPTOR.name),
        // Another thread, or another copy of this library, got there first.
        Err(err) if err.raw_os_error() == Some(ERROR_CLASS_ALREADY_EXISTS as i32) => (),
        Err(err) => return Err(os_error!(err)),
    }

    Ok(cell.get_or_init(|| class_name))
}

/// A zero sized window that is never shown, along with its own device context.
pub(super) struct HiddenWindow {
    hwnd: HWND,
    hdc: HDC,
}

impl HiddenWindow {
    pub fn new() -> Result<HiddenWindow, OsError> {
        let class_name = register_class()?;

        let hwnd = unsafe {
            CreateWindowExW(
                0,
                class_name.as_ptr(),
                ptr::null(),
                0,
                0,
                0,
                0,
                0,
                ptr::null_mut(),
                ptr::null_mut(),
                util::get_instance_handle(),
                ptr::null(),
            )
        };
        if hwnd.is_null() {
            return Err(last_os_error!());
        }

        let hdc = unsafe { GetDC(hwnd) };
        if hdc.is_null() {
            let error = last_os_error!();
            unsafe { DestroyWindow(hwnd) };
            return Err(error);
        }

        Ok(HiddenWindow { hwnd, hdc })
    }

    #[inline]
    pub fn hdc(&self) -> HDC {
        self.hdc
    }
}

impl Drop for HiddenWindow {
    fn drop(&mut self) {
        unsafe {
            ReleaseDC(self.hwnd, self.hdc);
            DestroyWindow(self.hwnd);
        }
    }
}
