//! Texel formats and pitch arithmetic.

/// Texel format in DXGI numbering.
///
/// Only the memory footprint matters to the trace format; formats this table
/// does not know report a zero pitch on both the writing and reading side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Format(u32);

/// Memory footprint class of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatLayout {
    /// One element per texel.
    Texel { bytes: u32 },
    /// One element per 4x4 block of texels.
    Block { bytes: u32 },
    /// Not in the table.
    Unknown,
}

impl Format {
    pub const UNKNOWN: Self = Self(0);
    pub const R32G32B32A32_FLOAT: Self = Self(2);
    pub const R32G32B32_FLOAT: Self = Self(6);
    pub const R16G16B16A16_FLOAT: Self = Self(10);
    pub const R32G32_FLOAT: Self = Self(16);
    pub const R10G10B10A2_UNORM: Self = Self(24);
    pub const R8G8B8A8_UNORM: Self = Self(28);
    pub const R8G8B8A8_UNORM_SRGB: Self = Self(29);
    pub const D32_FLOAT: Self = Self(40);
    pub const R32_FLOAT: Self = Self(41);
    pub const R32_UINT: Self = Self(42);
    pub const D24_UNORM_S8_UINT: Self = Self(45);
    pub const R8G8_UNORM: Self = Self(49);
    pub const R16_UINT: Self = Self(57);
    pub const D16_UNORM: Self = Self(55);
    pub const R8_UNORM: Self = Self(61);
    pub const BC1_UNORM: Self = Self(71);
    pub const BC3_UNORM: Self = Self(77);
    pub const BC4_UNORM: Self = Self(80);
    pub const BC5_UNORM: Self = Self(83);
    pub const B8G8R8A8_UNORM: Self = Self(87);
    pub const BC7_UNORM: Self = Self(98);

    /// Creates a format from its raw DXGI value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw DXGI value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Looks up the memory footprint of this format.
    #[must_use]
    pub const fn layout(self) -> FormatLayout {
        match self.0 {
            1..=4 => FormatLayout::Texel { bytes: 16 },
            5..=8 => FormatLayout::Texel { bytes: 12 },
            9..=22 => FormatLayout::Texel { bytes: 8 },
            23..=47 | 67..=69 | 87..=93 => FormatLayout::Texel { bytes: 4 },
            48..=59 | 85 | 86 | 115 => FormatLayout::Texel { bytes: 2 },
            60..=65 => FormatLayout::Texel { bytes: 1 },
            70..=72 | 79..=81 => FormatLayout::Block { bytes: 8 },
            73..=78 | 82..=84 | 94..=99 => FormatLayout::Block { bytes: 16 },
            _ => FormatLayout::Unknown,
        }
    }

    /// Returns `true` for block-compressed formats.
    #[must_use]
    pub const fn is_compressed(self) -> bool {
        matches!(self.layout(), FormatLayout::Block { .. })
    }

    /// Size in bytes of one row of `width` texels (one block row when compressed).
    #[must_use]
    pub const fn row_pitch(self, width: u32) -> u64 {
        match self.layout() {
            FormatLayout::Texel { bytes } => bytes as u64 * width as u64,
            FormatLayout::Block { bytes } => bytes as u64 * width.div_ceil(4) as u64,
            FormatLayout::Unknown => 0,
        }
    }

    /// Size in bytes of one slice of `height` texel rows spaced `row_pitch` apart.
    #[must_use]
    pub const fn slice_pitch(self, row_pitch: u64, height: u32) -> u64 {
        match self.layout() {
            FormatLayout::Texel { .. } => row_pitch * height as u64,
            FormatLayout::Block { .. } => row_pitch * height.div_ceil(4) as u64,
            FormatLayout::Unknown => 0,
        }
    }
}

impl From<u32> for Format {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Format> for u32 {
    fn from(format: Format) -> Self {
        format.0
    }
}
