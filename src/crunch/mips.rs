use image::{imageops::FilterType, RgbaImage};

use crate::error::{Result, TexWrapError};

const BAYER_4X4: [[i32; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

/// One level of a mip chain.
pub(crate) struct MipLevel {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

/// Builds `level_count` levels, each half the size of the previous one.
///
/// Every level is resampled from the base image.
pub(crate) fn build_chain(
    rgba: &[u8],
    width: u32,
    height: u32,
    level_count: u32,
) -> Result<Vec<MipLevel>> {
    let base = RgbaImage::from_raw(width, height, rgba.to_vec())
        .ok_or_else(|| TexWrapError::codec("crunch", "source does not match its dimensions"))?;

    let mut levels = Vec::with_capacity(level_count as usize);
    for level in 1..level_count {
        let level_width = (width >> level).max(1);
        let level_height = (height >> level).max(1);
        let resized = image::imageops::resize(&base, level_width, level_height, FilterType::CatmullRom);
        levels.push(MipLevel {
            width: level_width,
            height: level_height,
            rgba: resized.into_raw(),
        });
    }
    levels.insert(
        0,
        MipLevel {
            width,
            height,
            rgba: base.into_raw(),
        },
    );

    Ok(levels)
}

/// Reduces every channel to multiples of `step`, optionally with an ordered dither.
pub(crate) fn posterize(level: &mut MipLevel, step: u8, dither: bool) {
    if step <= 1 {
        return;
    }

    let step = step as i32;
    let width = level.width as usize;
    for (index, pixel) in level.rgba.chunks_exact_mut(4).enumerate() {
        let bias = if dither {
            let (x, y) = (index % width, index / width);
            (BAYER_4X4[y % 4][x % 4] * 2 - 15) * step / 32
        } else {
            0
        };

        for channel in pixel.iter_mut() {
            let value = (*channel as i32 + bias).clamp(0, 255);
            let quantized = (value + step / 2) / step * step;
            *channel = quantized.min(255) as u8;
        }
    }
}
