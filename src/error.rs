use std::ffi::NulError;
use std::{error, fmt, io};

/// An error that may be generated while creating or driving a [`Context`].
///
/// [`Context`]: crate::Context
#[derive(Debug)]
pub enum ContextError {
    /// [`enter`] was called on a context that is already current.
    ///
    /// [`enter`]: crate::Context::enter
    AlreadyEnabled,
    /// The context was destroyed by a previous exit and can't be entered again.
    Destroyed,
    /// The operation requires the context to be entered first.
    NotEnabled,
    /// A function name contained an interior nul byte.
    InvalidName(NulError),
    /// The platform or the driver can't provide what was requested.
    NotSupported(NotSupportedError),
    /// The OS cannot perform the operation.
    Os(OsError),
}

/// The error type for when the requested operation is not supported by the backend.
#[derive(Clone)]
pub struct NotSupportedError {
    reason: &'static str,
}

/// The error type for when the OS cannot perform the requested operation.
#[derive(Debug)]
pub struct OsError {
    line: u32,
    file: &'static str,
    error: io::Error,
}

impl NotSupportedError {
    /// Create a new [`NotSupportedError`] explaining what isn't supported.
    #[inline]
    pub fn new(reason: &'static str) -> NotSupportedError {
        NotSupportedError { reason }
    }

    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl OsError {
    /// Wrap `error`, recording where it happened. Usually built through `os_error!`.
    pub fn new(line: u32, file: &'static str, error: io::Error) -> OsError {
        OsError { line, file, error }
    }

    /// The underlying OS error.
    pub fn io_error(&self) -> &io::Error {
        &self.error
    }
}

#[allow(unused_macros)]
macro_rules! os_error {
    ($error:expr) => {{
        crate::error::OsError::new(line!(), file!(), $error)
    }};
}

/// Captures `GetLastError` right after a failed call.
#[allow(unused_macros)]
macro_rules! last_os_error {
    () => {{
        os_error!(std::io::Error::last_os_error())
    }};
}

impl From<OsError> for ContextError {
    fn from(value: OsError) -> Self {
        Self::Os(value)
    }
}

impl From<NulError> for ContextError {
    fn from(value: NulError) -> Self {
        Self::InvalidName(value)
    }
}

impl From<NotSupportedError> for ContextError {
    fn from(value: NotSupportedError) -> Self {
        Self::NotSupported(value)
    }
}

impl fmt::Display for OsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.pad(&format!("os error at {}:{}: {}", self.file, self.line, self.error))
    }
}

impl fmt::Debug for NotSupportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.debug_struct("NotSupportedError").field("reason", &self.reason).finish()
    }
}

impl fmt::Display for NotSupportedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.pad(self.reason)
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ContextError::AlreadyEnabled => write!(f, "context is already enabled"),
            ContextError::Destroyed => write!(f, "context is destroyed"),
            ContextError::NotEnabled => write!(f, "context is not enabled"),
            ContextError::InvalidName(e) => write!(f, "invalid function name: {e}"),
            ContextError::NotSupported(e) => e.fmt(f),
            ContextError::Os(e) => e.fmt(f),
        }
    }
}

impl error::Error for OsError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.error)
    }
}

impl error::Error for NotSupportedError {}

impl error::Error for ContextError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            ContextError::InvalidName(e) => Some(e),
            ContextError::NotSupported(e) => Some(e),
            ContextError::Os(e) => Some(e),
            _ => None,
        }
    }
}
