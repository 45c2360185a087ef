//! Mode code resolution.
//!
//! Callers select formats with the integer codes of the engine's texture format
//! enumeration. Each codec family accepts a different subset of those codes, so there
//! is one resolver per family. All of them fail closed with
//! [`TexWrapError::UnsupportedFormat`] for codes outside their table.

mod compressed;
mod layout;

pub use compressed::CompressedFormat;
pub use layout::{Channel, PixelLayout};

use crate::error::{Result, TexWrapError};

/// Mode codes of the engine texture format enumeration used throughout the crate.
pub mod mode {
    pub const ALPHA8: i32 = 1;
    pub const ARGB4444: i32 = 2;
    pub const RGB24: i32 = 3;
    pub const RGBA32: i32 = 4;
    pub const ARGB32: i32 = 5;
    pub const RGB565: i32 = 7;
    pub const R16: i32 = 9;
    pub const DXT1: i32 = 10;
    pub const DXT5: i32 = 12;
    pub const RGBA4444: i32 = 13;
    pub const BGRA32: i32 = 14;
    pub const RHALF: i32 = 15;
    pub const RGHALF: i32 = 16;
    pub const RGBAHALF: i32 = 17;
    pub const RFLOAT: i32 = 18;
    pub const RGFLOAT: i32 = 19;
    pub const RGBAFLOAT: i32 = 20;
    pub const YUY2: i32 = 21;
    pub const RGB9E5FLOAT: i32 = 22;
    pub const BC6H: i32 = 24;
    pub const BC7: i32 = 25;
    pub const BC4: i32 = 26;
    pub const BC5: i32 = 27;
    pub const DXT1_CRUNCHED: i32 = 28;
    pub const DXT5_CRUNCHED: i32 = 29;
    pub const PVRTC_RGB2: i32 = 30;
    pub const PVRTC_RGBA2: i32 = 31;
    pub const PVRTC_RGB4: i32 = 32;
    pub const PVRTC_RGBA4: i32 = 33;
    pub const ETC_RGB4: i32 = 34;
    pub const EAC_R: i32 = 41;
    pub const EAC_R_SIGNED: i32 = 42;
    pub const EAC_RG: i32 = 43;
    pub const EAC_RG_SIGNED: i32 = 44;
    pub const ETC2_RGB: i32 = 45;
    pub const ETC2_RGBA1: i32 = 46;
    pub const ETC2_RGBA8: i32 = 47;
    pub const ASTC_RGB_4X4: i32 = 48;
    pub const ASTC_RGB_5X5: i32 = 49;
    pub const ASTC_RGB_6X6: i32 = 50;
    pub const ASTC_RGB_8X8: i32 = 51;
    pub const ASTC_RGB_10X10: i32 = 52;
    pub const ASTC_RGB_12X12: i32 = 53;
    pub const ASTC_RGBA_4X4: i32 = 54;
    pub const ASTC_RGBA_5X5: i32 = 55;
    pub const ASTC_RGBA_6X6: i32 = 56;
    pub const ASTC_RGBA_8X8: i32 = 57;
    pub const ASTC_RGBA_10X10: i32 = 58;
    pub const ASTC_RGBA_12X12: i32 = 59;
    pub const ETC_RGB4_3DS: i32 = 60;
    pub const ETC_RGBA8_3DS: i32 = 61;
    pub const RG16: i32 = 62;
    pub const R8: i32 = 63;
    pub const ETC_RGB4_CRUNCHED: i32 = 64;
    pub const ETC2_RGBA8_CRUNCHED: i32 = 65;
}

/// Numeric representation of the channels.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum VariableType {
    UnsignedByteNorm,
    SignedFloat,
}

/// A format as the transcoder understands it.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum NativeFormat {
    Uncompressed(PixelLayout),
    Compressed(CompressedFormat),
}

impl NativeFormat {
    pub const fn native_id(&self) -> u64 {
        match self {
            NativeFormat::Uncompressed(layout) => layout.pixel_id(),
            NativeFormat::Compressed(format) => format.native_id(),
        }
    }
}

/// Output of [`resolve`].
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ResolvedFormat {
    pub format: NativeFormat,
    pub variable_type: VariableType,
}

impl ResolvedFormat {
    /// Byte size of a `width * height` image stored in this format.
    pub fn data_size(&self, width: u32, height: u32) -> Option<usize> {
        match self.format {
            NativeFormat::Uncompressed(layout) => layout.data_size(width, height),
            NativeFormat::Compressed(format) => format.data_size(width, height),
        }
    }
}

const fn pixel(tags: [u8; 4], bits: [u8; 4]) -> NativeFormat {
    NativeFormat::Uncompressed(PixelLayout::new(tags, bits))
}

const fn compressed(format: CompressedFormat) -> NativeFormat {
    NativeFormat::Compressed(format)
}

// The aliased entries (42, 44, 54..=59) are part of the caller contract and stay as is.
const TRANSCODE_TABLE: &[(i32, NativeFormat)] = &[
    (mode::ARGB32, pixel(*b"argb", [8, 8, 8, 8])),
    (mode::BGRA32, pixel(*b"bgra", [8, 8, 8, 8])),
    (mode::RGBA32, pixel(*b"rgba", [8, 8, 8, 8])),
    (mode::RGB24, pixel([b'r', b'g', b'b', 0], [8, 8, 8, 0])),
    (mode::ARGB4444, pixel(*b"argb", [4, 4, 4, 4])),
    (mode::RGBA4444, pixel(*b"rgba", [4, 4, 4, 4])),
    (mode::RGB565, pixel([b'r', b'g', b'b', 0], [5, 6, 5, 0])),
    (mode::ALPHA8, pixel([b'a', 0, 0, 0], [8, 0, 0, 0])),
    (mode::R8, pixel([b'r', 0, 0, 0], [8, 0, 0, 0])),
    (mode::R16, pixel([b'r', 0, 0, 0], [16, 0, 0, 0])),
    (mode::RG16, pixel([b'r', b'g', 0, 0], [16, 16, 0, 0])),
    (mode::RHALF, pixel([b'r', 0, 0, 0], [16, 0, 0, 0])),
    (mode::RGHALF, pixel([b'r', b'g', 0, 0], [16, 16, 0, 0])),
    (mode::RGBAHALF, pixel(*b"rgba", [16, 16, 16, 16])),
    (mode::RFLOAT, pixel([b'r', 0, 0, 0], [32, 0, 0, 0])),
    (mode::RGFLOAT, pixel([b'r', b'g', 0, 0], [32, 32, 0, 0])),
    (mode::RGBAFLOAT, pixel(*b"rgba", [32, 32, 32, 32])),
    (mode::EAC_R, compressed(CompressedFormat::EacR11)),
    (mode::EAC_R_SIGNED, compressed(CompressedFormat::EacR11)),
    (mode::EAC_RG, compressed(CompressedFormat::EacRg11)),
    (mode::EAC_RG_SIGNED, compressed(CompressedFormat::EacRg11)),
    (mode::ETC_RGB4, compressed(CompressedFormat::Etc1)),
    (mode::ETC2_RGB, compressed(CompressedFormat::Etc2Rgb)),
    (mode::ETC2_RGBA1, compressed(CompressedFormat::Etc2RgbA1)),
    (mode::ETC2_RGBA8, compressed(CompressedFormat::Etc2Rgba)),
    (mode::PVRTC_RGB2, compressed(CompressedFormat::PvrtcI2bppRgb)),
    (mode::PVRTC_RGBA2, compressed(CompressedFormat::PvrtcI2bppRgba)),
    (mode::PVRTC_RGB4, compressed(CompressedFormat::PvrtcI4bppRgb)),
    (mode::PVRTC_RGBA4, compressed(CompressedFormat::PvrtcI4bppRgba)),
    (mode::ASTC_RGB_4X4, compressed(CompressedFormat::Astc4x4)),
    (mode::ASTC_RGB_5X5, compressed(CompressedFormat::Astc5x5)),
    (mode::ASTC_RGB_6X6, compressed(CompressedFormat::Astc6x6)),
    (mode::ASTC_RGB_8X8, compressed(CompressedFormat::Astc8x8)),
    (mode::ASTC_RGB_10X10, compressed(CompressedFormat::Astc10x10)),
    (mode::ASTC_RGB_12X12, compressed(CompressedFormat::Astc12x12)),
    (mode::ASTC_RGBA_4X4, compressed(CompressedFormat::Astc4x4)),
    (mode::ASTC_RGBA_5X5, compressed(CompressedFormat::Astc5x5)),
    (mode::ASTC_RGBA_6X6, compressed(CompressedFormat::Astc6x6)),
    (mode::ASTC_RGBA_8X8, compressed(CompressedFormat::Astc8x8)),
    (mode::ASTC_RGBA_10X10, compressed(CompressedFormat::Astc10x10)),
    (mode::ASTC_RGBA_12X12, compressed(CompressedFormat::Astc12x12)),
];

/// Maps a mode code to the transcoder's native format and channel type.
pub fn resolve(mode_code: i32) -> Result<ResolvedFormat> {
    let format = TRANSCODE_TABLE
        .iter()
        .find(|(code, _)| *code == mode_code)
        .map(|(_, format)| *format)
        .ok_or(TexWrapError::UnsupportedFormat { mode: mode_code })?;

    let variable_type = match mode_code {
        mode::RHALF | mode::RGHALF | mode::RGBAHALF | mode::RFLOAT | mode::RGFLOAT
        | mode::RGBAFLOAT => VariableType::SignedFloat,
        _ => VariableType::UnsignedByteNorm,
    };

    Ok(ResolvedFormat {
        format,
        variable_type,
    })
}

/// Formats handled by the block compression codec.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum BlockFormat {
    /// BC1 (RGB, 1-bit alpha)
    Bc1,
    /// BC3 (RGBA, smooth alpha)
    Bc3,
    /// BC4 (R)
    Bc4,
    /// BC5 (RG)
    Bc5,
    /// BC7 (RGBA)
    Bc7,
}

impl BlockFormat {
    pub const fn block_byte_size(self) -> usize {
        match self {
            BlockFormat::Bc1 | BlockFormat::Bc4 => 8,
            BlockFormat::Bc3 | BlockFormat::Bc5 | BlockFormat::Bc7 => 16,
        }
    }

    /// Byte size of the blocks covering a `width * height` image.
    ///
    /// Width and height are rounded up to the nearest multiple of 4.
    pub fn data_size(self, width: u32, height: u32) -> Option<usize> {
        let blocks_x = width.div_ceil(4) as usize;
        let blocks_y = height.div_ceil(4) as usize;
        blocks_x
            .checked_mul(blocks_y)?
            .checked_mul(self.block_byte_size())
    }

    pub const fn name(self) -> &'static str {
        match self {
            BlockFormat::Bc1 => "bc1",
            BlockFormat::Bc3 => "bc3",
            BlockFormat::Bc4 => "bc4",
            BlockFormat::Bc5 => "bc5",
            BlockFormat::Bc7 => "bc7",
        }
    }
}

/// Maps a mode code to a block compression format.
pub fn resolve_block(mode_code: i32) -> Result<BlockFormat> {
    match mode_code {
        mode::DXT1 => Ok(BlockFormat::Bc1),
        mode::DXT5 => Ok(BlockFormat::Bc3),
        mode::BC4 => Ok(BlockFormat::Bc4),
        mode::BC5 => Ok(BlockFormat::Bc5),
        mode::BC7 => Ok(BlockFormat::Bc7),
        _ => Err(TexWrapError::UnsupportedFormat { mode: mode_code }),
    }
}

/// Block data carried inside a crunched container.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum CrunchPayload {
    Block(BlockFormat),
    Etc(CompressedFormat),
}

impl CrunchPayload {
    pub fn data_size(self, width: u32, height: u32) -> Option<usize> {
        match self {
            CrunchPayload::Block(format) => format.data_size(width, height),
            CrunchPayload::Etc(format) => format.data_size(width, height),
        }
    }
}

/// Formats produced by the variable-output compressor.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum CrunchedFormat {
    Dxt1,
    Dxt5,
    EtcRgb4,
    Etc2Rgba8,
}

impl CrunchedFormat {
    pub const fn payload(self) -> CrunchPayload {
        match self {
            CrunchedFormat::Dxt1 => CrunchPayload::Block(BlockFormat::Bc1),
            CrunchedFormat::Dxt5 => CrunchPayload::Block(BlockFormat::Bc3),
            CrunchedFormat::EtcRgb4 => CrunchPayload::Etc(CompressedFormat::Etc1),
            CrunchedFormat::Etc2Rgba8 => CrunchPayload::Etc(CompressedFormat::Etc2Rgba),
        }
    }

    pub const fn mode_code(self) -> i32 {
        match self {
            CrunchedFormat::Dxt1 => mode::DXT1_CRUNCHED,
            CrunchedFormat::Dxt5 => mode::DXT5_CRUNCHED,
            CrunchedFormat::EtcRgb4 => mode::ETC_RGB4_CRUNCHED,
            CrunchedFormat::Etc2Rgba8 => mode::ETC2_RGBA8_CRUNCHED,
        }
    }
}

/// Maps a mode code to a crunched format.
pub fn resolve_crunched(mode_code: i32) -> Result<CrunchedFormat> {
    match mode_code {
        mode::DXT1_CRUNCHED => Ok(CrunchedFormat::Dxt1),
        mode::DXT5_CRUNCHED => Ok(CrunchedFormat::Dxt5),
        mode::ETC_RGB4_CRUNCHED => Ok(CrunchedFormat::EtcRgb4),
        mode::ETC2_RGBA8_CRUNCHED => Ok(CrunchedFormat::Etc2Rgba8),
        _ => Err(TexWrapError::UnsupportedFormat { mode: mode_code }),
    }
}

/// The byte size callers allocate for an encoded `width * height` image of `mode_code`.
///
/// This is the caller side sizing table and is independent of [`resolve`]; the two
/// disagree for a few codes (see [`mode::RG16`]). Returns `None` for codes without a
/// known size.
pub fn encoded_byte_size(mode_code: i32, width: u32, height: u32) -> Option<usize> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    let blocks = |block_width: u32, block_height: u32, block_size: usize| {
        (width.div_ceil(block_width) as usize)
            .checked_mul(height.div_ceil(block_height) as usize)?
            .checked_mul(block_size)
    };

    match mode_code {
        mode::RGB9E5FLOAT | mode::ARGB32 | mode::BGRA32 | mode::RGBA32 => pixels.checked_mul(4),
        mode::RGB24 => pixels.checked_mul(3),
        mode::ARGB4444 | mode::RGBA4444 | mode::RGB565 => pixels.checked_mul(2),
        mode::ALPHA8 | mode::R8 => Some(pixels),
        mode::R16 | mode::RG16 | mode::RHALF | mode::YUY2 => pixels.checked_mul(2),
        mode::RGHALF | mode::RFLOAT => pixels.checked_mul(4),
        mode::RGBAHALF | mode::RGFLOAT => pixels.checked_mul(8),
        mode::RGBAFLOAT => pixels.checked_mul(16),
        mode::EAC_R | mode::EAC_R_SIGNED | mode::ETC_RGB4 | mode::ETC_RGB4_3DS => {
            blocks(4, 4, 8)
        }
        mode::EAC_RG
        | mode::EAC_RG_SIGNED
        | mode::ETC2_RGB
        | mode::ETC2_RGBA1
        | mode::ETC2_RGBA8
        | mode::ETC_RGBA8_3DS => blocks(4, 4, 16),
        mode::PVRTC_RGB2 | mode::PVRTC_RGBA2 => blocks(8, 4, 8),
        mode::PVRTC_RGB4 | mode::PVRTC_RGBA4 => blocks(4, 4, 8),
        mode::ASTC_RGB_4X4 | mode::ASTC_RGBA_4X4 => blocks(4, 4, 16),
        mode::ASTC_RGB_5X5 | mode::ASTC_RGBA_5X5 => blocks(5, 5, 16),
        mode::ASTC_RGB_6X6 | mode::ASTC_RGBA_6X6 => blocks(6, 6, 16),
        mode::ASTC_RGB_8X8 | mode::ASTC_RGBA_8X8 => blocks(8, 8, 16),
        mode::ASTC_RGB_10X10 | mode::ASTC_RGBA_10X10 => blocks(10, 10, 16),
        mode::ASTC_RGB_12X12 | mode::ASTC_RGBA_12X12 => blocks(12, 12, 16),
        mode::DXT1 | mode::BC4 => blocks(4, 4, 8),
        mode::DXT5 | mode::BC5 | mode::BC6H | mode::BC7 => blocks(4, 4, 16),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(mode::EAC_R, mode::EAC_R_SIGNED)]
    #[case(mode::EAC_RG, mode::EAC_RG_SIGNED)]
    #[case(mode::ASTC_RGB_4X4, mode::ASTC_RGBA_4X4)]
    #[case(mode::ASTC_RGB_5X5, mode::ASTC_RGBA_5X5)]
    #[case(mode::ASTC_RGB_6X6, mode::ASTC_RGBA_6X6)]
    #[case(mode::ASTC_RGB_8X8, mode::ASTC_RGBA_8X8)]
    #[case(mode::ASTC_RGB_10X10, mode::ASTC_RGBA_10X10)]
    #[case(mode::ASTC_RGB_12X12, mode::ASTC_RGBA_12X12)]
    fn aliased_codes_resolve_identically(#[case] code: i32, #[case] alias: i32) {
        assert_eq!(resolve(code).unwrap(), resolve(alias).unwrap());
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[case(mode::DXT1)]
    #[case(mode::ETC_RGB4_3DS)]
    #[case(mode::ETC_RGBA8_3DS)]
    #[case(-1)]
    #[case(i32::MAX)]
    fn unknown_codes_fail_closed(#[case] code: i32) {
        assert!(matches!(
            resolve(code),
            Err(TexWrapError::UnsupportedFormat { mode }) if mode == code
        ));
    }

    #[test]
    fn float_codes_are_signed_float() {
        for code in [
            mode::RHALF,
            mode::RGHALF,
            mode::RGBAHALF,
            mode::RFLOAT,
            mode::RGFLOAT,
            mode::RGBAFLOAT,
        ] {
            assert_eq!(resolve(code).unwrap().variable_type, VariableType::SignedFloat);
        }
        assert_eq!(
            resolve(mode::R16).unwrap().variable_type,
            VariableType::UnsignedByteNorm
        );
        assert_eq!(
            resolve(mode::R16).unwrap().format,
            resolve(mode::RHALF).unwrap().format
        );
    }

    #[test]
    fn every_table_code_is_unique() {
        for (index, (code, _)) in TRANSCODE_TABLE.iter().enumerate() {
            assert!(TRANSCODE_TABLE[index + 1..].iter().all(|(other, _)| other != code));
        }
        assert_eq!(TRANSCODE_TABLE.len(), 41);
    }

    #[test]
    fn rgba32_native_id() {
        let resolved = resolve(mode::RGBA32).unwrap();
        assert_eq!(resolved.format.native_id(), 0x0808_0808_6162_6772);
        assert_eq!(resolved.data_size(2, 2), Some(16));
    }

    #[rstest]
    #[case(mode::DXT1, 8)]
    #[case(mode::DXT5, 16)]
    #[case(mode::BC4, 8)]
    #[case(mode::BC5, 16)]
    #[case(mode::BC7, 16)]
    fn block_sizes_follow_block_law(#[case] code: i32, #[case] block_size: usize) {
        let format = resolve_block(code).unwrap();
        assert_eq!(format.data_size(13, 7), Some(4 * 2 * block_size));
        assert_eq!(encoded_byte_size(code, 13, 7), Some(4 * 2 * block_size));
    }

    #[test]
    fn bc6h_is_not_a_block_encoder_format() {
        assert!(resolve_block(mode::BC6H).is_err());
        assert_eq!(encoded_byte_size(mode::BC6H, 4, 4), Some(16));
    }

    #[test]
    fn crunched_codes() {
        assert_eq!(
            resolve_crunched(mode::DXT1_CRUNCHED).unwrap().payload(),
            CrunchPayload::Block(BlockFormat::Bc1)
        );
        assert_eq!(
            resolve_crunched(mode::ETC2_RGBA8_CRUNCHED).unwrap().payload(),
            CrunchPayload::Etc(CompressedFormat::Etc2Rgba)
        );
        assert!(resolve_crunched(mode::DXT1).is_err());
    }

    #[test]
    fn encoded_sizes_of_pixel_formats() {
        assert_eq!(encoded_byte_size(mode::RGB24, 3, 3), Some(27));
        assert_eq!(encoded_byte_size(mode::RG16, 2, 2), Some(8));
        assert_eq!(encoded_byte_size(mode::RGBAFLOAT, 2, 1), Some(32));
        assert_eq!(encoded_byte_size(mode::PVRTC_RGB2, 9, 4), Some(16));
        assert_eq!(encoded_byte_size(mode::DXT1_CRUNCHED, 4, 4), None);
    }
}
