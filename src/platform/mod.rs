//! The seam between [`Context`] and the OS.
//!
//! [`Context`]: crate::Context

use std::ffi::{c_void, CStr};

use crate::context::ContextAttributes;
use crate::error::{ContextError, OsError};

#[cfg(windows_platform)]
pub mod windows;

/// Everything [`Context`] needs from the platform.
///
/// A backend owns no per-context state itself; it hands out a [`Surface`] per context and is
/// told when to bind, unbind and release it.
///
/// [`Context`]: crate::Context
/// [`Surface`]: Backend::Surface
pub trait Backend {
    /// The resources backing one context: a hidden window, its device context and the
    /// rendering context created on it.
    type Surface;

    /// What is current on the calling thread, so it can be put back later.
    type Binding: Copy;

    /// Allocates the resources of a new context. Nothing is made current.
    fn create_surface(&self, attributes: &ContextAttributes) -> Result<Self::Surface, ContextError>;

    fn current_binding(&self) -> Self::Binding;

    /// Makes `surface` current on the calling thread.
    fn make_current(&self, surface: &Self::Surface) -> Result<(), OsError>;

    /// Puts back a binding returned by [`current_binding`](Backend::current_binding).
    fn restore(&self, binding: Self::Binding) -> Result<(), OsError>;

    /// Releases every resource of `surface`. Must not fail.
    fn destroy_surface(&self, surface: Self::Surface);

    /// Address of the OpenGL function `name`, or null when the driver doesn't know it.
    fn proc_address(&self, surface: &Self::Surface, name: &CStr) -> *const c_void;
}
