//! Payload size calculator.
//!
//! The writer and the reader both size texture payloads with
//! [`subresource_size`]; the recorded size is checked against it on decode.

use crate::types::{SubresourceBox, TextureDesc, TextureDimension};

/// Mip level addressed by `subresource`.
#[must_use]
pub const fn mip_level(texture: &TextureDesc, subresource: u32) -> u32 {
    if texture.levels == 0 {
        subresource
    } else {
        subresource % texture.levels as u32
    }
}

fn mip_extent(extent: u32, level: u32) -> u32 {
    extent.checked_shr(level).unwrap_or(0).max(1)
}

/// Byte length of one subresource's data.
///
/// `row_pitch` and `slice_pitch` are the pitches recorded with the data. When
/// `region` is given its extent replaces the mip extent.
#[must_use]
pub fn subresource_size(
    texture: &TextureDesc,
    subresource: u32,
    row_pitch: u32,
    slice_pitch: u32,
    region: Option<&SubresourceBox>,
) -> u64 {
    let level = mip_level(texture, subresource);
    let width = region.map_or_else(|| mip_extent(texture.width, level), SubresourceBox::width);
    let height = region.map_or_else(|| mip_extent(texture.height, level), SubresourceBox::height);

    match texture.dimension {
        TextureDimension::D1 => texture.format.row_pitch(width),
        TextureDimension::D2 | TextureDimension::Surface | TextureDimension::Framebuffer => {
            if row_pitch == 0 {
                0
            } else {
                texture.format.slice_pitch(u64::from(row_pitch), height)
            }
        }
        TextureDimension::D3 => {
            let depth = region.map_or_else(
                || mip_extent(u32::from(texture.depth_or_layers), level),
                SubresourceBox::depth,
            );
            u64::from(slice_pitch) * u64::from(depth)
        }
    }
}

/// Tightly packed row and slice pitch for a subresource.
///
/// Used by producers that hold unpadded data and by the headless backend.
#[must_use]
pub fn packed_pitches(
    texture: &TextureDesc,
    subresource: u32,
    region: Option<&SubresourceBox>,
) -> (u32, u32) {
    let level = mip_level(texture, subresource);
    let width = region.map_or_else(|| mip_extent(texture.width, level), SubresourceBox::width);
    let height = region.map_or_else(|| mip_extent(texture.height, level), SubresourceBox::height);
    let row = texture.format.row_pitch(width);
    let slice = texture.format.slice_pitch(row, height);
    (
        u32::try_from(row).unwrap_or(u32::MAX),
        u32::try_from(slice).unwrap_or(u32::MAX),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Format;

    fn texture(dimension: TextureDimension, w: u32, h: u32, d: u16, levels: u16, format: Format) -> TextureDesc {
        TextureDesc {
            dimension,
            width: w,
            height: h,
            depth_or_layers: d,
            levels,
            format,
            samples: 1,
        }
    }

    #[test]
    fn one_dimensional_uses_packed_row() {
        let tex = texture(TextureDimension::D1, 256, 1, 1, 3, Format::R8G8B8A8_UNORM);
        assert_eq!(subresource_size(&tex, 0, 0, 0, None), 1024);
        assert_eq!(subresource_size(&tex, 2, 0, 0, None), 256);
    }

    #[test]
    fn two_dimensional_uses_row_pitch_and_mip_height() {
        let tex = texture(TextureDimension::D2, 64, 32, 1, 2, Format::R8G8B8A8_UNORM);
        assert_eq!(subresource_size(&tex, 0, 256, 0, None), 256 * 32);
        // padded pitch is honoured
        assert_eq!(subresource_size(&tex, 1, 256, 0, None), 256 * 16);
        assert_eq!(subresource_size(&tex, 1, 0, 0, None), 0);
    }

    #[test]
    fn array_layers_wrap_to_level() {
        let tex = texture(TextureDimension::D2, 16, 16, 4, 2, Format::R8_UNORM);
        // subresource 3 = layer 1, level 1
        assert_eq!(mip_level(&tex, 3), 1);
        assert_eq!(subresource_size(&tex, 3, 8, 0, None), 64);
    }

    #[test]
    fn zero_levels_uses_index_as_level() {
        let tex = texture(TextureDimension::D2, 16, 16, 1, 0, Format::R8_UNORM);
        assert_eq!(mip_level(&tex, 2), 2);
        assert_eq!(subresource_size(&tex, 2, 4, 0, None), 16);
    }

    #[test]
    fn compressed_height_counts_block_rows() {
        let tex = texture(TextureDimension::D2, 64, 64, 1, 1, Format::BC1_UNORM);
        assert_eq!(subresource_size(&tex, 0, 128, 0, None), 128 * 16);
    }

    #[test]
    fn volume_depth_shrinks_with_level() {
        let tex = texture(TextureDimension::D3, 8, 8, 8, 2, Format::R8_UNORM);
        assert_eq!(subresource_size(&tex, 0, 8, 64, None), 512);
        assert_eq!(subresource_size(&tex, 1, 4, 16, None), 16 * 4);
    }

    #[test]
    fn region_overrides_extent() {
        let tex = texture(TextureDimension::D2, 1024, 1024, 1, 1, Format::R8G8B8A8_UNORM);
        let region = SubresourceBox::new([0, 0, 0], [4, 2, 1]);
        assert_eq!(subresource_size(&tex, 0, 16, 0, Some(&region)), 32);

        let volume = texture(TextureDimension::D3, 64, 64, 64, 1, Format::R8_UNORM);
        let region = SubresourceBox::new([0, 0, 8], [4, 4, 3]);
        assert_eq!(subresource_size(&volume, 0, 4, 16, Some(&region)), 48);
    }

    #[test]
    fn surfaces_size_like_2d() {
        for dimension in [TextureDimension::Surface, TextureDimension::Framebuffer] {
            let tex = texture(dimension, 8, 8, 1, 1, Format::B8G8R8A8_UNORM);
            assert_eq!(subresource_size(&tex, 0, 32, 0, None), 256);
        }
    }

    #[test]
    fn packed_pitches_match_calculator() {
        let tex = texture(TextureDimension::D2, 40, 20, 1, 3, Format::BC3_UNORM);
        for sub in 0..3 {
            let (row, slice) = packed_pitches(&tex, sub, None);
            assert_eq!(subresource_size(&tex, sub, row, slice, None), u64::from(slice));
        }
    }

    #[test]
    fn large_level_clamps_to_one() {
        let tex = texture(TextureDimension::D1, 4, 1, 1, 0, Format::R8_UNORM);
        assert_eq!(subresource_size(&tex, 40, 0, 0, None), 1);
    }
}
