use crate::settings::CompressorQuality;

const EAC_MODIFIERS: [[i32; 8]; 16] = [
    [-3, -6, -9, -15, 2, 5, 8, 14],
    [-3, -7, -10, -13, 2, 6, 9, 12],
    [-2, -5, -8, -13, 1, 4, 7, 12],
    [-2, -4, -6, -13, 1, 3, 5, 12],
    [-3, -6, -8, -12, 2, 5, 7, 11],
    [-3, -7, -9, -11, 2, 6, 8, 10],
    [-4, -7, -8, -11, 3, 6, 7, 10],
    [-3, -5, -8, -11, 2, 4, 7, 10],
    [-2, -6, -8, -10, 1, 5, 7, 9],
    [-2, -5, -8, -10, 1, 4, 7, 9],
    [-2, -4, -8, -10, 1, 3, 7, 9],
    [-2, -5, -7, -10, 1, 4, 6, 9],
    [-3, -4, -7, -10, 2, 3, 6, 9],
    [-1, -2, -3, -10, 0, 1, 2, 9],
    [-4, -6, -8, -9, 3, 5, 7, 8],
    [-3, -5, -7, -9, 2, 4, 6, 8],
];

// Table 13 holds a zero modifier at index 4, which reproduces flat blocks exactly.
const FLAT_TABLE: usize = 13;
const FLAT_INDEX: u64 = 4;

/// Single channel EAC block encoder, used for ETC2 alpha and the R11/RG11 formats.
pub(crate) struct BlockCompressorEac {
    block: [u8; 16],
}

impl Default for BlockCompressorEac {
    fn default() -> Self {
        Self { block: [0; 16] }
    }
}

impl BlockCompressorEac {
    /// Loads one channel of a 4x4 block. Pixels past the image edge repeat the edge.
    pub(crate) fn load_block_channel(
        &mut self,
        rgba_data: &[u8],
        xx: usize,
        yy: usize,
        width: usize,
        height: usize,
        channel: usize,
    ) {
        for y in 0..4 {
            for x in 0..4 {
                let pixel_x = (xx * 4 + x).min(width - 1);
                let pixel_y = (yy * 4 + y).min(height - 1);

                let offset = (pixel_y * width + pixel_x) * 4;
                self.block[y * 4 + x] = rgba_data[offset + channel];
            }
        }
    }

    fn block_error(&self, base: i32, table: usize, multiplier: i32, indices: &mut [u8; 16]) -> u32 {
        let modifiers = &EAC_MODIFIERS[table];
        let mut total = 0;

        for (pixel, &value) in self.block.iter().enumerate() {
            let mut best = (u32::MAX, 0u8);
            for (index, &modifier) in modifiers.iter().enumerate() {
                let decoded = (base + modifier * multiplier).clamp(0, 255);
                let error = (decoded - value as i32).unsigned_abs().pow(2);
                if error < best.0 {
                    best = (error, index as u8);
                }
            }
            total += best.0;
            indices[pixel] = best.1;
        }

        total
    }

    pub(crate) fn compress_block_eac(&self, quality: CompressorQuality) -> u64 {
        let min = *self.block.iter().min().unwrap_or(&0) as i32;
        let max = *self.block.iter().max().unwrap_or(&0) as i32;

        if min == max {
            let mut packed = (min as u64) << 56 | 1 << 52 | (FLAT_TABLE as u64) << 48;
            for i in 0..16 {
                packed |= FLAT_INDEX << (45 - 3 * i);
            }
            return packed;
        }

        let base_offsets: &[i32] = match quality {
            CompressorQuality::High => &[-1, 0, 1],
            CompressorQuality::Best => &[-2, -1, 0, 1, 2],
            _ => &[0],
        };
        let brute_force_multiplier = quality >= CompressorQuality::Normal;

        let mut best_error = u32::MAX;
        let mut best = (0, 0, 1, [0u8; 16]);
        let mut indices = [0u8; 16];

        for (table, modifiers) in EAC_MODIFIERS.iter().enumerate() {
            let low = modifiers[3];
            let high = modifiers[7];
            let span = high - low;

            let multipliers = if brute_force_multiplier {
                1..=15
            } else {
                let fitted = ((max - min) + span / 2) / span;
                let fitted = fitted.clamp(1, 15);
                fitted..=fitted
            };

            for multiplier in multipliers {
                let center = (min + max - (low + high) * multiplier) / 2;
                for offset in base_offsets {
                    let base = (center + offset).clamp(0, 255);
                    let error = self.block_error(base, table, multiplier, &mut indices);
                    if error < best_error {
                        best_error = error;
                        best = (base, table, multiplier, indices);
                    }
                }
            }
        }

        let (base, table, multiplier, indices) = best;
        Self::pack(base as u64, multiplier as u64, table as u64, &indices)
    }

    fn pack(base: u64, multiplier: u64, table: u64, indices: &[u8; 16]) -> u64 {
        let mut packed = base << 56 | multiplier << 52 | table << 48;

        // Pixel indices are stored column by column, first pixel in the highest bits.
        for x in 0..4 {
            for y in 0..4 {
                let i = x * 4 + y;
                packed |= (indices[y * 4 + x] as u64) << (45 - 3 * i);
            }
        }

        packed
    }
}

/// Modifier index of every pixel in row-major order.
fn unpack_indices(packed: u64) -> [usize; 16] {
    let mut indices = [0usize; 16];
    for x in 0..4 {
        for y in 0..4 {
            let i = x * 4 + y;
            indices[y * 4 + x] = ((packed >> (45 - 3 * i)) & 0x7) as usize;
        }
    }
    indices
}

fn unpack_header(packed: u64) -> (i32, i32, [i32; 8]) {
    let base = (packed >> 56) as i32;
    let multiplier = ((packed >> 52) & 0xF) as i32;
    let table = ((packed >> 48) & 0xF) as usize;
    (base, multiplier, EAC_MODIFIERS[table])
}

/// Decodes an 8-bit ETC2 alpha block into row-major values.
pub(crate) fn decode_block_alpha(packed: u64) -> [u8; 16] {
    let (base, multiplier, modifiers) = unpack_header(packed);
    unpack_indices(packed)
        .map(|index| (base + modifiers[index] * multiplier).clamp(0, 255) as u8)
}

/// Decodes an 11-bit EAC R11 block into row-major values, truncated to 8 bits.
pub(crate) fn decode_block_r11(packed: u64) -> [u8; 16] {
    let (base, multiplier, modifiers) = unpack_header(packed);
    unpack_indices(packed).map(|index| {
        let step = if multiplier == 0 {
            modifiers[index]
        } else {
            modifiers[index] * multiplier * 8
        };
        ((base * 8 + 4 + step).clamp(0, 2047) >> 3) as u8
    })
}
