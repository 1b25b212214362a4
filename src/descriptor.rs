//! The build record of the native library.
//!
//! This module is shared with `build.rs`, which includes it by path, so it must not refer to
//! anything else in the crate.

/// Flat description of the native library this crate produces.
///
/// The record carries no compiler flags, include paths or platform conditionals. Whether the
/// link libraries are actually requested is decided by the build script, since they only exist
/// on Windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionDescriptor {
    /// Name of the produced library target.
    pub name: &'static str,
    /// Compilation units of the library.
    pub sources: &'static [&'static str],
    /// Platform libraries resolved at link time.
    pub libraries: &'static [&'static str],
    /// Package name.
    pub distribution: &'static str,
    /// Package version.
    pub version: &'static str,
}

/// The descriptor of `headless_context`.
pub const DESCRIPTOR: ExtensionDescriptor = ExtensionDescriptor {
    name: "headless_context",
    sources: &["src/lib.rs"],
    libraries: &["user32", "gdi32", "opengl32"],
    distribution: "headless-context",
    version: "0.9.0",
};

impl ExtensionDescriptor {
    /// Cargo directives linking every library, in declaration order.
    pub fn link_directives(&self) -> impl Iterator<Item = String> + '_ {
        self.libraries.iter().map(|lib| format!("cargo:rustc-link-lib={lib}"))
    }

    /// Whether `library` is one of the link libraries.
    pub fn links(&self, library: &str) -> bool {
        self.libraries.iter().any(|lib| lib.eq_ignore_ascii_case(library))
    }
}
