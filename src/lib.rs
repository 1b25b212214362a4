//! Headless OpenGL contexts.
//!
//! A [`Context`] owns a window that is never shown, its device context and an OpenGL rendering
//! context created on it. Nothing is ever presented; the context exists so OpenGL can be used
//! for off-screen rendering or compute.
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() -> Result<(), headless_context::error::ContextError> {
//! use headless_context::{ContextAttributes, HeadlessContext};
//!
//! let mut context = HeadlessContext::new(ContextAttributes::new())?;
//! let current = context.make_current()?;
//! let get_string = current.load_function("glGetString")?;
//! assert!(!get_string.is_null());
//! // Dropping `current` exits, which destroys a context that isn't reusable.
//! # Ok(())
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```
//!
//! # Entering and exiting
//!
//! [`Context::enter`] makes the context current on the calling thread and remembers what was
//! current before. [`Context::exit`] puts that back. By default the first exit also destroys
//! the context; set [`ContextAttributes::reusable`] to enter it any number of times.
//! [`Context::load_function`] only works between the two.
//!
//! # Platform support
//!
//! Only Windows has a backend, built on WGL, and the crate links `user32`, `gdi32` and
//! `opengl32` there (see [`descriptor`]). On other platforms the state machine is still
//! available through [`Context::with_backend`] and the [`platform::Backend`] trait.
//!
//! # Features
//!
//! - `serde`: implements `Serialize`/`Deserialize` for [`ContextAttributes`] and the pixel
//!   format types, so they can come from a configuration file.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[macro_use]
pub mod error;

mod context;
pub mod descriptor;
pub mod pixel_format;
pub mod platform;

#[cfg(windows_platform)]
pub use crate::context::HeadlessContext;
pub use crate::context::{Context, ContextAttributes, CurrentGuard};
pub use crate::error::ContextError;
