//! WGL backend.
//!
//! A headless context is an ordinary WGL context created on the device context of a window that
//! is never shown.

use std::ffi::{c_void, CStr};
use std::{mem, ptr};

use tracing::debug;
use windows_sys::Win32::Foundation::HMODULE;
use windows_sys::Win32::Graphics::Gdi::HDC;
use windows_sys::Win32::Graphics::OpenGL::{
    wglCreateContext, wglDeleteContext, wglGetCurrentContext, wglGetCurrentDC, wglGetProcAddress,
    wglMakeCurrent, DescribePixelFormat, SetPixelFormat, HGLRC, PFD_TYPE_RGBA,
    PIXELFORMATDESCRIPTOR,
};
use windows_sys::Win32::System::LibraryLoader::{GetModuleHandleA, GetProcAddress, LoadLibraryA};

use self::window::HiddenWindow;
use super::Backend;
use crate::context::ContextAttributes;
use crate::error::{ContextError, OsError};
use crate::pixel_format::{self, PixelFormat, PixelFormatFlags};

mod util;
mod window;

/// The WGL implementation of [`Backend`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Wgl;

/// The `(HDC, HGLRC)` pair current on a thread. Both are null when nothing is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WglBinding {
    pub hdc: HDC,
    pub hglrc: HGLRC,
}

/// Destroys the rendering context when dropped.
struct ContextWrapper(HGLRC);

impl Drop for ContextWrapper {
    fn drop(&mut self) {
        unsafe {
            wglDeleteContext(self.0);
        }
    }
}

/// Resources backing one headless context.
///
/// Field order matters: the rendering context is deleted before the window's device context is
/// released.
pub struct WglSurface {
    context: ContextWrapper,
    window: HiddenWindow,

    /// `wglGetProcAddress` returns null for GL 1.1 functions because they are exported directly
    /// by `opengl32.dll`.
    gl_library: HMODULE,

    pixel_format: PixelFormat,
}

impl WglSurface {
    /// The pixel format the hidden window was set up with.
    pub fn pixel_format(&self) -> &PixelFormat {
        &self.pixel_format
    }

    pub fn hglrc(&self) -> HGLRC {
        self.context.0
    }
}

impl Backend for Wgl {
    type Binding = WglBinding;
    type Surface = WglSurface;

    fn create_surface(&self, attributes: &ContextAttributes) -> Result<WglSurface, ContextError> {
        let window = HiddenWindow::new()?;
        let hdc = window.hdc();

        let formats = unsafe { enumerate_pixel_formats(hdc) };
        let pixel_format = pixel_format::choose(formats, &attributes.pixel_format)?;
        unsafe { set_pixel_format(hdc, pixel_format.index)? };
        debug!("using pixel format {pixel_format:?}");

        let hglrc = unsafe { wglCreateContext(hdc) };
        if hglrc.is_null() {
            return Err(last_os_error!().into());
        }
        let context = ContextWrapper(hglrc);

        let gl_library = load_opengl32()?;

        Ok(WglSurface { context, window, gl_library, pixel_format })
    }

    fn current_binding(&self) -> WglBinding {
        unsafe { WglBinding { hdc: wglGetCurrentDC(), hglrc: wglGetCurrentContext() } }
    }

    fn make_current(&self, surface: &WglSurface) -> Result<(), OsError> {
        let result = unsafe { wglMakeCurrent(surface.window.hdc(), surface.context.0) };
        util::win_to_err(result).map_err(|err| os_error!(err))
    }

    fn restore(&self, binding: WglBinding) -> Result<(), OsError> {
        let result = unsafe { wglMakeCurrent(binding.hdc, binding.hglrc) };
        util::win_to_err(result).map_err(|err| os_error!(err))
    }

    fn destroy_surface(&self, surface: WglSurface) {
        debug!("destroying headless context {:?}", surface.context.0);
        drop(surface);
    }

    fn proc_address(&self, surface: &WglSurface, name: &CStr) -> *const c_void {
        unsafe {
            let address = GetProcAddress(surface.gl_library, name.as_ptr().cast())
                .map_or(ptr::null(), |f| f as *const c_void);
            if !address.is_null() {
                return address;
            }

            let address =
                wglGetProcAddress(name.as_ptr().cast()).map_or(ptr::null(), |f| f as *const c_void);
            util::sanitize_proc_address(address)
        }
    }
}

/// `opengl32.dll` is mapped as soon as WGL is used, it is only loaded here if it isn't.
fn load_opengl32() -> Result<HMODULE, OsError> {
    let name = c"opengl32.dll";
    let module = unsafe { GetModuleHandleA(name.as_ptr().cast()) };
    if !module.is_null() {
        return Ok(module);
    }

    let module = unsafe { LoadLibraryA(name.as_ptr().cast()) };
    if module.is_null() {
        return Err(last_os_error!());
    }

    Ok(module)
}

unsafe fn describe_pixel_format(hdc: HDC, index: i32) -> Option<PIXELFORMATDESCRIPTOR> {
    let mut descriptor: PIXELFORMATDESCRIPTOR = unsafe { mem::zeroed() };
    let size = mem::size_of::<PIXELFORMATDESCRIPTOR>() as u32;

    if unsafe { DescribePixelFormat(hdc, index, size, &mut descriptor) } == 0 {
        return None;
    }

    Some(descriptor)
}

/// Lists every pixel format of `hdc`, in index order.
unsafe fn enumerate_pixel_formats(hdc: HDC) -> Vec<PixelFormat> {
    // Asking about format 1 with no output buffer returns the number of formats.
    let size = mem::size_of::<PIXELFORMATDESCRIPTOR>() as u32;
    let count = unsafe { DescribePixelFormat(hdc, 1, size, ptr::null_mut()) };

    (1..=count)
        .filter_map(|index| {
            let descriptor = unsafe { describe_pixel_format(hdc, index)? };
            Some(PixelFormat {
                index,
                flags: PixelFormatFlags::from_bits_truncate(descriptor.dwFlags),
                rgba: descriptor.iPixelType == PFD_TYPE_RGBA,
                color_bits: descriptor
                    .cRedBits
                    .saturating_add(descriptor.cGreenBits)
                    .saturating_add(descriptor.cBlueBits),
                alpha_bits: descriptor.cAlphaBits,
                depth_bits: descriptor.cDepthBits,
                stencil_bits: descriptor.cStencilBits,
            })
        })
        .collect()
}

unsafe fn set_pixel_format(hdc: HDC, index: i32) -> Result<(), OsError> {
    let descriptor =
        unsafe { describe_pixel_format(hdc, index) }.ok_or_else(|| last_os_error!())?;
    let result = unsafe { SetPixelFormat(hdc, index, &descriptor) };
    util::win_to_err(result).map_err(|err| os_error!(err))
}
