//! ETC1, ETC2 and EAC block encoders, and the EAC channel decoder.
//!
//! ETC colour blocks decode through `texture2ddecoder`. EAC channel blocks (R11, RG11
//! and the ETC2 alpha half) decode here. Blocks are big endian, the byte order the
//! formats define.

mod alpha;
mod color;

use alpha::{decode_block_alpha, decode_block_r11, BlockCompressorEac};
use color::BlockCompressorEtc;

use crate::{
    error::{Result, TexWrapError},
    format::CompressedFormat,
    settings::CompressorQuality,
};

/// Returns true if [`compress_rgba8`] can produce `format`.
pub const fn can_encode(format: CompressedFormat) -> bool {
    matches!(
        format,
        CompressedFormat::Etc1
            | CompressedFormat::Etc2Rgb
            | CompressedFormat::Etc2RgbA1
            | CompressedFormat::Etc2Rgba
            | CompressedFormat::EacR11
            | CompressedFormat::EacRg11
    )
}

/// Compresses an RGBA8 image into `blocks_buffer`.
///
/// Partial edge blocks repeat the last row and column. `blocks_buffer` must hold
/// `format.data_size(width, height)` bytes.
pub fn compress_rgba8(
    format: CompressedFormat,
    rgba_data: &[u8],
    blocks_buffer: &mut [u8],
    width: u32,
    height: u32,
    quality: CompressorQuality,
) -> Result<()> {
    if !can_encode(format) {
        return Err(TexWrapError::codec(
            "etc",
            format!("no encoder for {}", format.name()),
        ));
    }

    let required = format
        .data_size(width, height)
        .ok_or(TexWrapError::InvalidDimensions { width, height })?;
    TexWrapError::check_len(required, blocks_buffer.len())?;
    TexWrapError::check_len(crate::error::rgba8_len(width, height)?, rgba_data.len())?;

    let width = width as usize;
    let height = height as usize;
    let block_width = width.div_ceil(4);
    let block_height = height.div_ceil(4);
    let block_size = format.block_byte_size();

    let mut color = BlockCompressorEtc::default();
    let mut channel = BlockCompressorEac::default();

    for yy in 0..block_height {
        for xx in 0..block_width {
            let offset = (yy * block_width + xx) * block_size;
            let out = &mut blocks_buffer[offset..offset + block_size];

            match format {
                CompressedFormat::Etc1 | CompressedFormat::Etc2Rgb => {
                    color.load_block_interleaved_rgba(rgba_data, xx, yy, width, height);
                    store(out, &[color.compress_block_etc1(quality)]);
                }
                CompressedFormat::Etc2RgbA1 => {
                    color.load_block_interleaved_rgba(rgba_data, xx, yy, width, height);
                    store(out, &[color.compress_block_punch_through(quality)]);
                }
                CompressedFormat::Etc2Rgba => {
                    channel.load_block_channel(rgba_data, xx, yy, width, height, 3);
                    color.load_block_interleaved_rgba(rgba_data, xx, yy, width, height);
                    store(
                        out,
                        &[
                            channel.compress_block_eac(quality),
                            color.compress_block_etc1(quality),
                        ],
                    );
                }
                CompressedFormat::EacR11 => {
                    channel.load_block_channel(rgba_data, xx, yy, width, height, 0);
                    store(out, &[channel.compress_block_eac(quality)]);
                }
                CompressedFormat::EacRg11 => {
                    channel.load_block_channel(rgba_data, xx, yy, width, height, 0);
                    let red = channel.compress_block_eac(quality);
                    channel.load_block_channel(rgba_data, xx, yy, width, height, 1);
                    store(out, &[red, channel.compress_block_eac(quality)]);
                }
                _ => {
                    return Err(TexWrapError::codec(
                        "etc",
                        format!("no encoder for {}", format.name()),
                    ))
                }
            }
        }
    }

    Ok(())
}

/// Decodes the EAC channel blocks of `format` into an RGBA8 image.
///
/// R11 and RG11 write the channels they carry, zero the other colour channels and make
/// alpha opaque. ETC2 RGBA8 only writes alpha; its colour half is left to the caller.
pub fn decompress_eac_rgba8(
    format: CompressedFormat,
    blocks_buffer: &[u8],
    rgba_data: &mut [u8],
    width: u32,
    height: u32,
) -> Result<()> {
    let required = format
        .data_size(width, height)
        .ok_or(TexWrapError::InvalidDimensions { width, height })?;
    TexWrapError::check_len(required, blocks_buffer.len())?;
    TexWrapError::check_len(crate::error::rgba8_len(width, height)?, rgba_data.len())?;

    let width = width as usize;
    let height = height as usize;
    let block_width = width.div_ceil(4);
    let block_height = height.div_ceil(4);
    let block_size = format.block_byte_size();

    match format {
        CompressedFormat::EacR11 | CompressedFormat::EacRg11 => {
            for pixel in rgba_data.chunks_exact_mut(4) {
                pixel.copy_from_slice(&[0, 0, 0, 255]);
            }
        }
        CompressedFormat::Etc2Rgba => {}
        _ => {
            return Err(TexWrapError::codec(
                "etc",
                format!("{} has no EAC channel", format.name()),
            ))
        }
    }

    for yy in 0..block_height {
        for xx in 0..block_width {
            let offset = (yy * block_width + xx) * block_size;
            let block = &blocks_buffer[offset..offset + block_size];

            let mut write_channel = |values: [u8; 16], channel: usize| {
                for y in 0..4 {
                    for x in 0..4 {
                        let (pixel_x, pixel_y) = (xx * 4 + x, yy * 4 + y);
                        if pixel_x < width && pixel_y < height {
                            rgba_data[(pixel_y * width + pixel_x) * 4 + channel] = values[y * 4 + x];
                        }
                    }
                }
            };

            match format {
                CompressedFormat::EacR11 => write_channel(decode_block_r11(load(block, 0)), 0),
                CompressedFormat::EacRg11 => {
                    write_channel(decode_block_r11(load(block, 0)), 0);
                    write_channel(decode_block_r11(load(block, 1)), 1);
                }
                _ => write_channel(decode_block_alpha(load(block, 0)), 3),
            }
        }
    }

    Ok(())
}

/// Reads the `index`th big endian `u64` of a block.
#[inline(always)]
fn load(block: &[u8], index: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&block[index * 8..index * 8 + 8]);
    u64::from_be_bytes(bytes)
}

#[inline(always)]
fn store(out: &mut [u8], blocks: &[u64]) {
    for (chunk, block) in out.chunks_exact_mut(8).zip(blocks) {
        chunk.copy_from_slice(&block.to_be_bytes());
    }
}
