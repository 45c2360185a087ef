#![allow(dead_code)]

pub mod metrics;

/// Opaque image with a red ramp along x, a green ramp along y and constant blue.
pub fn gradient_rgba(width: u32, height: u32) -> Vec<u8> {
    let span = |extent: u32| extent.saturating_sub(1).max(1);
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            rgba.extend_from_slice(&[
                (x * 255 / span(width)) as u8,
                (y * 255 / span(height)) as u8,
                128,
                255,
            ]);
        }
    }
    rgba
}

/// Checkerboard of two colours with square cells.
pub fn checker_rgba(width: u32, height: u32, cell: u32, even: [u8; 4], odd: [u8; 4]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let pixel = if (x / cell + y / cell) % 2 == 0 { even } else { odd };
            rgba.extend_from_slice(&pixel);
        }
    }
    rgba
}

pub fn solid_rgba(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
    std::iter::repeat(pixel)
        .take((width * height) as usize)
        .flatten()
        .collect()
}

/// Deterministic pseudo random pixels, alpha included.
pub fn noise_rgba(width: u32, height: u32, seed: u32) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..width * height * 4)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}

/// Independent ramps per channel: red along x, green along y, alpha along the diagonal.
pub fn channel_ramps_rgba(width: u32, height: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            rgba.extend_from_slice(&[
                (x * 16).min(255) as u8,
                (y * 24).min(255) as u8,
                77,
                255u32.saturating_sub((x + y) * 12) as u8,
            ]);
        }
    }
    rgba
}
