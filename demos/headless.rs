//! Creates a headless context and prints the OpenGL implementation behind it.

use std::error::Error;

#[cfg(windows_platform)]
fn main() -> Result<(), Box<dyn Error>> {
    use std::ffi::CStr;

    use headless_context::{ContextAttributes, HeadlessContext};

    type GetString = unsafe extern "system" fn(u32) -> *const u8;
    const GL_VENDOR: u32 = 0x1F00;
    const GL_RENDERER: u32 = 0x1F01;
    const GL_VERSION: u32 = 0x1F02;

    tracing_subscriber::fmt::init();

    let mut context = HeadlessContext::new(ContextAttributes::new())?;
    if let Some(surface) = context.surface() {
        println!("pixel format: {:?}", surface.pixel_format());
    }

    let current = context.make_current()?;
    let address = current.load_function("glGetString")?;
    if address.is_null() {
        return Err("glGetString is not available".into());
    }
    let get_string: GetString = unsafe { std::mem::transmute(address) };

    let strings = [("vendor", GL_VENDOR), ("renderer", GL_RENDERER), ("version", GL_VERSION)];
    for (label, name) in strings {
        let value = unsafe { get_string(name) };
        if !value.is_null() {
            let value = unsafe { CStr::from_ptr(value.cast()) };
            println!("{label}: {}", value.to_string_lossy());
        }
    }

    current.exit()?;
    Ok(())
}

#[cfg(not(windows_platform))]
fn main() -> Result<(), Box<dyn Error>> {
    Err("headless contexts are only available on Windows".into())
}
