use std::ffi::{c_void, CString};
use std::marker::PhantomData;
use std::mem;
use std::ops::Deref;

use tracing::{debug, trace, warn};

use crate::error::ContextError;
use crate::pixel_format::PixelFormatRequirements;
use crate::platform::Backend;
#[cfg(windows_platform)]
use crate::platform::windows::Wgl;

/// Attributes to use when creating a context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContextAttributes {
    /// Keep the context alive after [`Context::exit`] so it can be entered again.
    ///
    /// The default is `false`: the first exit destroys the context.
    pub reusable: bool,
    /// Constraints on the pixel format of the hidden window.
    pub pixel_format: PixelFormatRequirements,
}

impl ContextAttributes {
    /// Initializes new attributes with default values.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets whether the context survives [`Context::exit`].
    #[inline]
    pub fn with_reusable(mut self, reusable: bool) -> Self {
        self.reusable = reusable;
        self
    }

    /// Sets the constraints on the pixel format of the hidden window.
    #[inline]
    pub fn with_pixel_format(mut self, requirements: PixelFormatRequirements) -> Self {
        self.pixel_format = requirements;
        self
    }
}

/// A headless OpenGL context on the WGL backend.
#[cfg(windows_platform)]
pub type HeadlessContext = Context<Wgl>;

/// An OpenGL context that is not attached to anything visible.
///
/// Entering the context makes it current on the calling thread and remembers whatever was
/// current before; exiting puts that back. Unless the context is reusable, exiting also destroys
/// it, after which it can't be entered anymore.
///
/// A context is bound to the thread that created it and is therefore neither `Send` nor `Sync`.
pub struct Context<B: Backend> {
    backend: B,
    /// `None` once destroyed.
    surface: Option<B::Surface>,
    reusable: bool,
    /// What was current before entering. `Some` exactly while the context is enabled.
    previous: Option<B::Binding>,
    _thread_bound: PhantomData<*const ()>,
}

#[cfg(windows_platform)]
impl Context<Wgl> {
    /// Creates a hidden window and an OpenGL context on it.
    ///
    /// The context is not made current.
    pub fn new(attributes: ContextAttributes) -> Result<Self, ContextError> {
        Self::with_backend(Wgl, attributes)
    }
}

impl<B: Backend> Context<B> {
    /// Creates a context on a specific backend.
    pub fn with_backend(backend: B, attributes: ContextAttributes) -> Result<Self, ContextError> {
        let surface = backend.create_surface(&attributes)?;
        debug!(reusable = attributes.reusable, "created headless context");

        Ok(Context {
            backend,
            surface: Some(surface),
            reusable: attributes.reusable,
            previous: None,
            _thread_bound: PhantomData,
        })
    }

    /// Makes the context current on this thread.
    ///
    /// Fails with [`ContextError::AlreadyEnabled`] if it already is, and with
    /// [`ContextError::Destroyed`] if a previous exit destroyed it.
    pub fn enter(&mut self) -> Result<(), ContextError> {
        if self.previous.is_some() {
            return Err(ContextError::AlreadyEnabled);
        }
        let surface = self.surface.as_ref().ok_or(ContextError::Destroyed)?;

        let previous = self.backend.current_binding();
        self.backend.make_current(surface)?;
        self.previous = Some(previous);

        trace!("entered headless context");
        Ok(())
    }

    /// Puts back whatever was current before [`enter`](Self::enter).
    ///
    /// A context that isn't reusable is destroyed first. The context is no longer enabled
    /// afterwards, even when restoring the previous binding fails.
    pub fn exit(&mut self) -> Result<(), ContextError> {
        let previous = self.previous.take().ok_or(ContextError::NotEnabled)?;

        if !self.reusable {
            self.destroy();
        }

        self.backend.restore(previous)?;

        trace!("exited headless context");
        Ok(())
    }

    /// Enters the context for the lifetime of the returned guard.
    pub fn make_current(&mut self) -> Result<CurrentGuard<'_, B>, ContextError> {
        self.enter()?;
        Ok(CurrentGuard { context: self })
    }

    /// Returns the address of an OpenGL function.
    ///
    /// Only available while the context is enabled. Names the driver doesn't know resolve to a
    /// null pointer.
    pub fn load_function(&self, name: &str) -> Result<*const c_void, ContextError> {
        // A destroyed context is never enabled.
        let (Some(_), Some(surface)) = (&self.previous, &self.surface) else {
            return Err(ContextError::NotEnabled);
        };

        let name = CString::new(name)?;
        Ok(self.backend.proc_address(surface, &name))
    }

    /// Whether the context is current through [`enter`](Self::enter).
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.previous.is_some()
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.surface.is_none()
    }

    #[inline]
    pub fn is_reusable(&self) -> bool {
        self.reusable
    }

    /// The platform resources of the context, unless it was destroyed.
    #[inline]
    pub fn surface(&self) -> Option<&B::Surface> {
        self.surface.as_ref()
    }

    fn destroy(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.backend.destroy_surface(surface);
            debug!("destroyed headless context");
        }
    }
}

impl<B: Backend> Drop for Context<B> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(err) = self.backend.restore(previous) {
                warn!("failed to restore the previous context: {err}");
            }
        }

        self.destroy();
    }
}

/// Keeps a [`Context`] entered; dropping it exits the context.
///
/// Errors while exiting on drop are logged. Use [`CurrentGuard::exit`] to observe them.
pub struct CurrentGuard<'a, B: Backend> {
    context: &'a mut Context<B>,
}

impl<B: Backend> CurrentGuard<'_, B> {
    /// Exits the context now.
    pub fn exit(self) -> Result<(), ContextError> {
        let result = self.context.exit();
        mem::forget(self);
        result
    }
}

impl<B: Backend> Deref for CurrentGuard<'_, B> {
    type Target = Context<B>;

    fn deref(&self) -> &Context<B> {
        self.context
    }
}

impl<B: Backend> Drop for CurrentGuard<'_, B> {
    fn drop(&mut self) {
        if let Err(err) = self.context.exit() {
            warn!("failed to exit headless context: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::ffi::CStr;
    use std::io;
    use std::rc::Rc;

    use super::*;
    use crate::error::OsError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Create(u32),
        MakeCurrent(u32),
        Restore(u32),
        Destroy(u32),
    }

    /// Surfaces are numbered from 1; binding 0 means nothing is current.
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<Call>>,
        current: Cell<u32>,
        next_id: Cell<u32>,
        fail_make_current: Cell<bool>,
        fail_restore: Cell<bool>,
    }

    #[derive(Clone, Default)]
    struct MockBackend(Rc<Recorder>);

    impl MockBackend {
        fn calls(&self) -> Vec<Call> {
            self.0.calls.borrow().clone()
        }

        fn current(&self) -> u32 {
            self.0.current.get()
        }

        fn destroyed(&self, id: u32) -> usize {
            self.calls().iter().filter(|call| **call == Call::Destroy(id)).count()
        }
    }

    impl Backend for MockBackend {
        type Binding = u32;
        type Surface = u32;

        fn create_surface(&self, _: &ContextAttributes) -> Result<u32, ContextError> {
            let id = self.0.next_id.get() + 1;
            self.0.next_id.set(id);
            self.0.calls.borrow_mut().push(Call::Create(id));
            Ok(id)
        }

        fn current_binding(&self) -> u32 {
            self.0.current.get()
        }

        fn make_current(&self, surface: &u32) -> Result<(), OsError> {
            if self.0.fail_make_current.get() {
                return Err(os_error!(io::Error::from(io::ErrorKind::Other)));
            }
            self.0.calls.borrow_mut().push(Call::MakeCurrent(*surface));
            self.0.current.set(*surface);
            Ok(())
        }

        fn restore(&self, binding: u32) -> Result<(), OsError> {
            if self.0.fail_restore.get() {
                return Err(os_error!(io::Error::from(io::ErrorKind::Other)));
            }
            self.0.calls.borrow_mut().push(Call::Restore(binding));
            self.0.current.set(binding);
            Ok(())
        }

        fn destroy_surface(&self, surface: u32) {
            self.0.calls.borrow_mut().push(Call::Destroy(surface));
            if self.0.current.get() == surface {
                self.0.current.set(0);
            }
        }

        fn proc_address(&self, _: &u32, name: &CStr) -> *const c_void {
            match name.to_bytes() {
                b"glClear" => 0x1000 as *const c_void,
                b"glGetString" => 0x2000 as *const c_void,
                _ => std::ptr::null(),
            }
        }
    }

    fn context(backend: &MockBackend, reusable: bool) -> Context<MockBackend> {
        let attributes = ContextAttributes::new().with_reusable(reusable);
        Context::with_backend(backend.clone(), attributes).unwrap()
    }

    #[test]
    fn single_use_context_is_destroyed_on_exit() {
        let backend = MockBackend::default();
        let mut context = context(&backend, false);

        context.enter().unwrap();
        assert!(context.is_enabled());
        assert_eq!(backend.current(), 1);

        context.exit().unwrap();
        assert!(!context.is_enabled());
        assert!(context.is_destroyed());
        assert_eq!(backend.current(), 0);

        assert!(matches!(context.enter(), Err(ContextError::Destroyed)));
        assert_eq!(backend.calls(), [
            Call::Create(1),
            Call::MakeCurrent(1),
            Call::Destroy(1),
            Call::Restore(0),
        ]);
    }

    #[test]
    fn reusable_context_can_be_entered_again() {
        let backend = MockBackend::default();
        let mut context = context(&backend, true);

        for _ in 0..3 {
            context.enter().unwrap();
            context.exit().unwrap();
        }

        assert!(!context.is_destroyed());
        assert_eq!(backend.destroyed(1), 0);

        drop(context);
        assert_eq!(backend.destroyed(1), 1);
    }

    #[test]
    fn state_errors() {
        let backend = MockBackend::default();
        let mut context = context(&backend, true);

        assert!(matches!(context.exit(), Err(ContextError::NotEnabled)));

        context.enter().unwrap();
        assert!(matches!(context.enter(), Err(ContextError::AlreadyEnabled)));
        // The failed enter must not clobber the saved binding.
        context.exit().unwrap();
        assert_eq!(backend.current(), 0);

        assert!(matches!(context.exit(), Err(ContextError::NotEnabled)));
    }

    #[test]
    fn load_function_requires_enabled_context() {
        let backend = MockBackend::default();
        let mut context = context(&backend, false);

        assert!(matches!(context.load_function("glClear"), Err(ContextError::NotEnabled)));

        context.enter().unwrap();
        assert_eq!(context.load_function("glClear").unwrap() as usize, 0x1000);
        assert!(context.load_function("glNotAFunction").unwrap().is_null());
        assert!(matches!(context.load_function("gl\0Clear"), Err(ContextError::InvalidName(_))));

        context.exit().unwrap();
        assert!(matches!(context.load_function("glClear"), Err(ContextError::NotEnabled)));
    }

    #[test]
    fn previous_binding_is_restored() {
        let backend = MockBackend::default();
        let mut outer = context(&backend, true);
        let mut inner = context(&backend, false);

        outer.enter().unwrap();
        inner.enter().unwrap();
        assert_eq!(backend.current(), 2);

        inner.exit().unwrap();
        assert_eq!(backend.current(), 1);

        outer.exit().unwrap();
        assert_eq!(backend.current(), 0);
    }

    #[test]
    fn dropping_enabled_context_restores_then_destroys() {
        let backend = MockBackend::default();
        let mut outer = context(&backend, true);
        outer.enter().unwrap();

        let mut inner = context(&backend, true);
        inner.enter().unwrap();
        drop(inner);

        assert_eq!(backend.current(), 1);
        assert_eq!(&backend.calls()[4..], [Call::Restore(1), Call::Destroy(2)]);
    }

    #[test]
    fn drop_after_destruction_does_nothing() {
        let backend = MockBackend::default();
        let mut context = context(&backend, false);
        context.enter().unwrap();
        context.exit().unwrap();

        let before = backend.calls().len();
        drop(context);
        assert_eq!(backend.calls().len(), before);
        assert_eq!(backend.destroyed(1), 1);
    }

    #[test]
    fn dropping_idle_context_destroys_it() {
        let backend = MockBackend::default();
        drop(context(&backend, false));

        assert_eq!(backend.calls(), [Call::Create(1), Call::Destroy(1)]);
    }

    #[test]
    fn failed_make_current_leaves_context_idle() {
        let backend = MockBackend::default();
        let mut context = context(&backend, false);

        backend.0.fail_make_current.set(true);
        assert!(matches!(context.enter(), Err(ContextError::Os(_))));
        assert!(!context.is_enabled());
        assert!(!context.is_destroyed());

        backend.0.fail_make_current.set(false);
        context.enter().unwrap();
    }

    #[test]
    fn failed_restore_still_leaves_context() {
        let backend = MockBackend::default();
        let mut context = context(&backend, true);
        context.enter().unwrap();

        backend.0.fail_restore.set(true);
        assert!(matches!(context.exit(), Err(ContextError::Os(_))));
        assert!(!context.is_enabled());

        backend.0.fail_restore.set(false);
        context.enter().unwrap();
    }

    #[test]
    fn guard_exits_on_drop() {
        let backend = MockBackend::default();
        let mut context = context(&backend, true);

        {
            let guard = context.make_current().unwrap();
            assert!(guard.is_enabled());
            assert!(!guard.load_function("glGetString").unwrap().is_null());
        }

        assert!(!context.is_enabled());
        assert_eq!(backend.current(), 0);
    }

    #[test]
    fn guard_exit_reports_result_once() {
        let backend = MockBackend::default();
        let mut context = context(&backend, false);

        let guard = context.make_current().unwrap();
        guard.exit().unwrap();

        assert!(context.is_destroyed());
        assert_eq!(
            backend.calls().iter().filter(|call| matches!(call, Call::Restore(_))).count(),
            1
        );
    }

    #[test]
    fn attributes_builder() {
        let attributes = ContextAttributes::new().with_reusable(true).with_pixel_format(
            PixelFormatRequirements { min_depth_bits: 24, ..Default::default() },
        );

        assert!(attributes.reusable);
        assert_eq!(attributes.pixel_format.min_depth_bits, 24);
        assert!(!ContextAttributes::default().reusable);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn attributes_from_partial_config() {
        let attributes: ContextAttributes =
            serde_json::from_str(r#"{ "reusable": true }"#).unwrap();
        assert_eq!(attributes, ContextAttributes::new().with_reusable(true));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn pixel_format_from_partial_config() {
        let config = r#"{ "reusable": true, "pixel_format": { "min_depth_bits": 24 } }"#;
        let attributes: ContextAttributes = serde_json::from_str(config).unwrap();

        let expected = PixelFormatRequirements { min_depth_bits: 24, ..Default::default() };
        let expected = ContextAttributes::new().with_reusable(true).with_pixel_format(expected);
        assert_eq!(attributes, expected);
    }
}
