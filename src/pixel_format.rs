//! Pixel format description and selection.
//!
//! The hidden window backing a headless context still needs a pixel format before a rendering
//! context can be created on its device context. The backend enumerates what the driver offers
//! and [`choose`] picks one.

use bitflags::bitflags;

use crate::error::{ContextError, NotSupportedError};

bitflags! {
    /// Capabilities advertised by a pixel format.
    ///
    /// The bit values mirror the `PFD_*` flags of `PIXELFORMATDESCRIPTOR`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct PixelFormatFlags: u32 {
        const DOUBLE_BUFFER = 0x0000_0001;
        const STEREO = 0x0000_0002;
        const DRAW_TO_WINDOW = 0x0000_0004;
        const SUPPORT_OPENGL = 0x0000_0020;
        const GENERIC_FORMAT = 0x0000_0040;
    }
}

/// A pixel format offered by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFormat {
    /// One-based index understood by `SetPixelFormat`.
    pub index: i32,
    pub flags: PixelFormatFlags,
    /// Whether the pixels are RGBA rather than color-indexed.
    pub rgba: bool,
    pub color_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
}

impl PixelFormat {
    /// Whether an OpenGL context can be created on a window using this format at all.
    pub fn is_usable(&self) -> bool {
        let required = PixelFormatFlags::DRAW_TO_WINDOW | PixelFormatFlags::SUPPORT_OPENGL;
        self.rgba && self.flags.contains(required)
    }

    /// Formats implemented by the generic software renderer are not accelerated.
    pub fn hardware_accelerated(&self) -> bool {
        !self.flags.contains(PixelFormatFlags::GENERIC_FORMAT)
    }
}

/// Constraints a pixel format has to satisfy.
///
/// The default accepts any usable format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PixelFormatRequirements {
    /// `Some(true)` rejects software formats, `Some(false)` rejects accelerated ones.
    pub hardware_accelerated: Option<bool>,
    pub double_buffer: Option<bool>,
    /// Sum of the red, green and blue bits.
    pub min_color_bits: u8,
    pub min_alpha_bits: u8,
    pub min_depth_bits: u8,
    pub min_stencil_bits: u8,
}

impl PixelFormatRequirements {
    /// Whether `format` satisfies every constraint. Usability is checked separately.
    pub fn matches(&self, format: &PixelFormat) -> bool {
        if let Some(accelerated) = self.hardware_accelerated {
            if format.hardware_accelerated() != accelerated {
                return false;
            }
        }

        if let Some(double_buffer) = self.double_buffer {
            if format.flags.contains(PixelFormatFlags::DOUBLE_BUFFER) != double_buffer {
                return false;
            }
        }

        format.color_bits >= self.min_color_bits
            && format.alpha_bits >= self.min_alpha_bits
            && format.depth_bits >= self.min_depth_bits
            && format.stencil_bits >= self.min_stencil_bits
    }
}

/// Picks a pixel format out of `formats`.
///
/// The first usable, matching and hardware accelerated format wins. When the driver only offers
/// software formats the first usable matching one is returned instead.
pub fn choose<I>(
    formats: I,
    requirements: &PixelFormatRequirements,
) -> Result<PixelFormat, ContextError>
where
    I: IntoIterator<Item = PixelFormat>,
{
    let mut backup = None;

    for format in formats {
        if !format.is_usable() || !requirements.matches(&format) {
            continue;
        }

        if format.hardware_accelerated() {
            return Ok(format);
        }

        if backup.is_none() {
            backup = Some(format);
        }
    }

    backup.ok_or_else(|| {
        NotSupportedError::new("no pixel format satisfies the requirements").into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(index: i32, flags: PixelFormatFlags) -> PixelFormat {
        PixelFormat {
            index,
            flags,
            rgba: true,
            color_bits: 24,
            alpha_bits: 8,
            depth_bits: 24,
            stencil_bits: 8,
        }
    }

    const WINDOW_GL: PixelFormatFlags =
        PixelFormatFlags::DRAW_TO_WINDOW.union(PixelFormatFlags::SUPPORT_OPENGL);

    #[test]
    fn prefers_accelerated_formats() {
        let formats = vec![
            format(1, WINDOW_GL | PixelFormatFlags::GENERIC_FORMAT),
            format(2, PixelFormatFlags::DRAW_TO_WINDOW),
            format(3, WINDOW_GL | PixelFormatFlags::DOUBLE_BUFFER),
        ];

        let chosen = choose(formats, &PixelFormatRequirements::default()).unwrap();
        assert_eq!(chosen.index, 3);
    }

    #[test]
    fn falls_back_to_first_software_format() {
        let formats = vec![
            format(1, PixelFormatFlags::SUPPORT_OPENGL),
            format(2, WINDOW_GL | PixelFormatFlags::GENERIC_FORMAT),
            format(3, WINDOW_GL | PixelFormatFlags::GENERIC_FORMAT),
        ];

        let chosen = choose(formats, &PixelFormatRequirements::default()).unwrap();
        assert_eq!(chosen.index, 2);
    }

    #[test]
    fn color_indexed_formats_are_skipped() {
        let mut indexed = format(1, WINDOW_GL);
        indexed.rgba = false;
        assert!(!indexed.is_usable());

        let err = choose(vec![indexed], &PixelFormatRequirements::default()).unwrap_err();
        assert!(matches!(err, ContextError::NotSupported(_)));
    }

    #[test]
    fn no_formats_is_not_supported() {
        let err = choose(Vec::new(), &PixelFormatRequirements::default()).unwrap_err();
        assert!(matches!(err, ContextError::NotSupported(_)));
        assert_eq!(err.to_string(), "no pixel format satisfies the requirements");
    }

    #[test]
    fn requirements_filter_formats() {
        let mut shallow = format(1, WINDOW_GL);
        shallow.depth_bits = 16;
        let single = format(2, WINDOW_GL);
        let double = format(3, WINDOW_GL | PixelFormatFlags::DOUBLE_BUFFER);

        let requirements = PixelFormatRequirements {
            double_buffer: Some(true),
            min_depth_bits: 24,
            ..Default::default()
        };
        assert!(!requirements.matches(&shallow));
        assert!(!requirements.matches(&single));

        let chosen = choose(vec![shallow, single, double], &requirements).unwrap();
        assert_eq!(chosen.index, 3);
    }

    #[test]
    fn software_only_requirement() {
        let requirements =
            PixelFormatRequirements { hardware_accelerated: Some(false), ..Default::default() };
        let formats =
            vec![format(1, WINDOW_GL), format(2, WINDOW_GL | PixelFormatFlags::GENERIC_FORMAT)];

        assert_eq!(choose(formats, &requirements).unwrap().index, 2);
    }
}
