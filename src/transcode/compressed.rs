use crate::{
    error::{Result, TexWrapError},
    etc,
    format::CompressedFormat,
};

/// Decodes ETC, EAC, PVRTC or ASTC blocks into RGBA8.
pub(crate) fn decode_rgba8(
    format: CompressedFormat,
    blocks: &[u8],
    rgba: &mut [u8],
    width: u32,
    height: u32,
) -> Result<()> {
    if matches!(format, CompressedFormat::EacR11 | CompressedFormat::EacRg11) {
        return etc::decompress_eac_rgba8(format, blocks, rgba, width, height);
    }

    let dimensions = (width, height);
    let width = width as usize;
    let height = height as usize;
    let mut pixels = vec![0u32; width * height];

    let decoded = match format {
        CompressedFormat::Etc1 => texture2ddecoder::decode_etc1(blocks, width, height, &mut pixels),
        CompressedFormat::Etc2Rgb => {
            texture2ddecoder::decode_etc2_rgb(blocks, width, height, &mut pixels)
        }
        CompressedFormat::Etc2RgbA1 => {
            texture2ddecoder::decode_etc2_rgba1(blocks, width, height, &mut pixels)
        }
        CompressedFormat::Etc2Rgba => {
            // Colour from the second half of each block; alpha is filled in below.
            let color: Vec<u8> = blocks
                .chunks_exact(16)
                .flat_map(|block| block[8..].iter().copied())
                .collect();
            texture2ddecoder::decode_etc2_rgb(&color, width, height, &mut pixels)
        }
        CompressedFormat::EacR11 | CompressedFormat::EacRg11 => Ok(()),
        CompressedFormat::PvrtcI2bppRgb | CompressedFormat::PvrtcI2bppRgba => {
            texture2ddecoder::decode_pvrtc_2bpp(blocks, width, height, &mut pixels)
        }
        CompressedFormat::PvrtcI4bppRgb | CompressedFormat::PvrtcI4bppRgba => {
            texture2ddecoder::decode_pvrtc_4bpp(blocks, width, height, &mut pixels)
        }
        CompressedFormat::Astc4x4
        | CompressedFormat::Astc5x5
        | CompressedFormat::Astc6x6
        | CompressedFormat::Astc8x8
        | CompressedFormat::Astc10x10
        | CompressedFormat::Astc12x12 => {
            let (block_width, block_height) = format.block_dimensions();
            texture2ddecoder::decode_astc(
                blocks,
                width,
                height,
                block_width as usize,
                block_height as usize,
                &mut pixels,
            )
        }
    };
    decoded.map_err(|reason| TexWrapError::codec("transcode", reason))?;

    // Decoded pixels are 0xAARRGGBB.
    for (pixel, out) in pixels.iter().zip(rgba.chunks_exact_mut(4)) {
        let [b, g, r, a] = pixel.to_le_bytes();
        out.copy_from_slice(&[r, g, b, a]);
    }

    if format == CompressedFormat::Etc2Rgba {
        etc::decompress_eac_rgba8(format, blocks, rgba, dimensions.0, dimensions.1)?;
    }

    Ok(())
}
