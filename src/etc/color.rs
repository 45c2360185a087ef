use crate::settings::CompressorQuality;

const ETC1_MODIFIERS: [[i32; 2]; 8] = [
    [2, 8],
    [5, 17],
    [9, 29],
    [13, 42],
    [18, 60],
    [24, 80],
    [33, 106],
    [47, 183],
];

// Pixel index of a punch-through transparent texel.
const TRANSPARENT_INDEX: u32 = 2;

/// How pixel indices map onto intensity modifiers.
#[derive(Copy, Clone, Eq, PartialEq)]
enum Modifiers {
    /// `+small, +large, -small, -large`
    Opaque,
    /// `0, +large, transparent, -large`
    PunchThrough,
}

impl Modifiers {
    fn offset(self, table: usize, index: u32) -> Option<i32> {
        let [small, large] = ETC1_MODIFIERS[table];
        match (self, index) {
            (Modifiers::Opaque, 0) => Some(small),
            (Modifiers::PunchThrough, 0) => Some(0),
            (_, 1) => Some(large),
            (Modifiers::Opaque, 2) => Some(-small),
            (Modifiers::PunchThrough, 2) => None,
            _ => Some(-large),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum BaseColors {
    /// Two RGB444 colours.
    Individual,
    /// RGB555 colour plus a signed RGB333 delta.
    Differential,
}

impl BaseColors {
    const fn max_code(self) -> i32 {
        match self {
            BaseColors::Individual => 15,
            BaseColors::Differential => 31,
        }
    }

    fn quantize(self, value: i32) -> i32 {
        let max = self.max_code();
        ((value * max + 127) / 255).clamp(0, max)
    }

    fn expand(self, code: i32) -> i32 {
        match self {
            BaseColors::Individual => (code << 4) | code,
            BaseColors::Differential => (code << 3) | (code >> 2),
        }
    }
}

#[derive(Copy, Clone)]
struct SubblockFit {
    error: u64,
    table: u32,
    indices: [u32; 16],
}

#[derive(Copy, Clone)]
struct Candidate {
    error: u64,
    packed: u64,
}

/// ETC1 / ETC2 colour block encoder.
///
/// Only emits individual and differential blocks whose second base colour stays in
/// range, which every ETC2 decoder reads the same way as an ETC1 decoder.
pub(crate) struct BlockCompressorEtc {
    block: [[u8; 4]; 16],
}

impl Default for BlockCompressorEtc {
    fn default() -> Self {
        Self {
            block: [[0; 4]; 16],
        }
    }
}

impl BlockCompressorEtc {
    /// Loads a 4x4 block of RGBA8 pixels. Pixels past the image edge repeat the edge.
    pub(crate) fn load_block_interleaved_rgba(
        &mut self,
        rgba_data: &[u8],
        xx: usize,
        yy: usize,
        width: usize,
        height: usize,
    ) {
        for y in 0..4 {
            for x in 0..4 {
                let pixel_x = (xx * 4 + x).min(width - 1);
                let pixel_y = (yy * 4 + y).min(height - 1);

                let offset = (pixel_y * width + pixel_x) * 4;
                self.block[y * 4 + x].copy_from_slice(&rgba_data[offset..offset + 4]);
            }
        }
    }

    /// Encodes an opaque ETC1 block.
    pub(crate) fn compress_block_etc1(&self, quality: CompressorQuality) -> u64 {
        self.compress_color(quality, Modifiers::Opaque, true)
    }

    /// Encodes an ETC2 RGB A1 block. Texels with alpha below 128 become transparent.
    pub(crate) fn compress_block_punch_through(&self, quality: CompressorQuality) -> u64 {
        if self.block.iter().any(|pixel| pixel[3] < 128) {
            // Opaque bit cleared.
            self.compress_color(quality, Modifiers::PunchThrough, false) & !(1 << 33)
        } else {
            self.compress_color(quality, Modifiers::Opaque, false)
        }
    }

    fn compress_color(
        &self,
        quality: CompressorQuality,
        modifiers: Modifiers,
        allow_individual: bool,
    ) -> u64 {
        let flips: &[bool] = match quality {
            CompressorQuality::Fastest => &[false],
            _ => &[false, true],
        };
        let shifts: &[i32] = match quality {
            CompressorQuality::High => &[-1, 0, 1],
            CompressorQuality::Best => &[-2, -1, 0, 1, 2],
            _ => &[0],
        };

        let mut best: Option<Candidate> = None;
        let mut consider = |candidate: Candidate| {
            if best.map_or(true, |best| candidate.error < best.error) {
                best = Some(candidate);
            }
        };

        for &flip in flips {
            let averages = [
                self.subblock_average(flip, 0, modifiers),
                self.subblock_average(flip, 1, modifiers),
            ];

            consider(self.fit_differential(flip, averages, shifts, modifiers));
            if allow_individual {
                consider(self.fit_individual(flip, averages, shifts, modifiers));
            }
        }

        best.map_or(0, |candidate| candidate.packed)
    }

    fn fit_individual(
        &self,
        flip: bool,
        averages: [[i32; 3]; 2],
        shifts: &[i32],
        modifiers: Modifiers,
    ) -> Candidate {
        let mode = BaseColors::Individual;
        let mut codes = [[0i32; 3]; 2];
        let mut fits = [None::<SubblockFit>; 2];

        for sub in 0..2 {
            let base_code = averages[sub].map(|value| mode.quantize(value));
            for &shift in shifts {
                let code = base_code.map(|c| (c + shift).clamp(0, mode.max_code()));
                let fit = self.fit_subblock(flip, sub, code.map(|c| mode.expand(c)), modifiers);
                if fits[sub].map_or(true, |best| fit.error < best.error) {
                    fits[sub] = Some(fit);
                    codes[sub] = code;
                }
            }
        }

        self.pack(mode, flip, codes, fits)
    }

    fn fit_differential(
        &self,
        flip: bool,
        averages: [[i32; 3]; 2],
        shifts: &[i32],
        modifiers: Modifiers,
    ) -> Candidate {
        let mode = BaseColors::Differential;
        let mut codes = [[0i32; 3]; 2];
        let mut fits = [None::<SubblockFit>; 2];

        let first_code = averages[0].map(|value| mode.quantize(value));
        for &shift in shifts {
            let code = first_code.map(|c| (c + shift).clamp(0, mode.max_code()));
            let fit = self.fit_subblock(flip, 0, code.map(|c| mode.expand(c)), modifiers);
            if fits[0].map_or(true, |best| fit.error < best.error) {
                fits[0] = Some(fit);
                codes[0] = code;
            }
        }

        // The second colour is stored as a 3-bit signed delta from the first.
        let second_code = averages[1].map(|value| mode.quantize(value));
        for &shift in shifts {
            let mut code = [0i32; 3];
            for channel in 0..3 {
                let target = (second_code[channel] + shift).clamp(0, mode.max_code());
                code[channel] = codes[0][channel] + (target - codes[0][channel]).clamp(-4, 3);
            }
            let fit = self.fit_subblock(flip, 1, code.map(|c| mode.expand(c)), modifiers);
            if fits[1].map_or(true, |best| fit.error < best.error) {
                fits[1] = Some(fit);
                codes[1] = code;
            }
        }

        self.pack(mode, flip, codes, fits)
    }

    fn in_subblock(flip: bool, sub: usize, pixel: usize) -> bool {
        let (x, y) = (pixel % 4, pixel / 4);
        let second = if flip { y >= 2 } else { x >= 2 };
        second == (sub == 1)
    }

    fn is_transparent(modifiers: Modifiers, pixel: &[u8; 4]) -> bool {
        modifiers == Modifiers::PunchThrough && pixel[3] < 128
    }

    fn subblock_average(&self, flip: bool, sub: usize, modifiers: Modifiers) -> [i32; 3] {
        let mut sum = [0i32; 3];
        let mut count = 0;

        for (index, pixel) in self.block.iter().enumerate() {
            if !Self::in_subblock(flip, sub, index) || Self::is_transparent(modifiers, pixel) {
                continue;
            }
            for channel in 0..3 {
                sum[channel] += pixel[channel] as i32;
            }
            count += 1;
        }

        if count == 0 {
            return [0; 3];
        }
        sum.map(|value| (value + count / 2) / count)
    }

    fn fit_subblock(
        &self,
        flip: bool,
        sub: usize,
        base: [i32; 3],
        modifiers: Modifiers,
    ) -> SubblockFit {
        let mut best = SubblockFit {
            error: u64::MAX,
            table: 0,
            indices: [0; 16],
        };

        for table in 0..ETC1_MODIFIERS.len() {
            let mut error = 0u64;
            let mut indices = [0u32; 16];

            for (index, pixel) in self.block.iter().enumerate() {
                if !Self::in_subblock(flip, sub, index) {
                    continue;
                }
                if Self::is_transparent(modifiers, pixel) {
                    indices[index] = TRANSPARENT_INDEX;
                    continue;
                }

                let mut best_pixel = (u64::MAX, 0);
                for candidate in 0..4 {
                    let Some(offset) = modifiers.offset(table, candidate) else {
                        continue;
                    };
                    let pixel_error = (0..3)
                        .map(|channel| {
                            let decoded = (base[channel] + offset).clamp(0, 255);
                            (decoded - pixel[channel] as i32).pow(2) as u64
                        })
                        .sum::<u64>();
                    if pixel_error < best_pixel.0 {
                        best_pixel = (pixel_error, candidate);
                    }
                }

                error += best_pixel.0;
                indices[index] = best_pixel.1;
            }

            if error < best.error {
                best = SubblockFit {
                    error,
                    table: table as u32,
                    indices,
                };
            }
        }

        best
    }

    fn pack(
        &self,
        mode: BaseColors,
        flip: bool,
        codes: [[i32; 3]; 2],
        fits: [Option<SubblockFit>; 2],
    ) -> Candidate {
        let [Some(first), Some(second)] = fits else {
            return Candidate {
                error: u64::MAX,
                packed: 0,
            };
        };

        let mut packed = 0u64;
        match mode {
            BaseColors::Individual => {
                for channel in 0..3 {
                    let shift = 60 - channel * 8;
                    packed |= (codes[0][channel] as u64) << shift;
                    packed |= (codes[1][channel] as u64) << (shift - 4);
                }
            }
            BaseColors::Differential => {
                for channel in 0..3 {
                    let shift = 59 - channel * 8;
                    let delta = (codes[1][channel] - codes[0][channel]) & 0x7;
                    packed |= (codes[0][channel] as u64) << shift;
                    packed |= (delta as u64) << (shift - 3);
                }
                packed |= 1 << 33;
            }
        }

        packed |= (first.table as u64) << 37;
        packed |= (second.table as u64) << 34;
        packed |= (flip as u64) << 32;

        // Indices are stored column by column, most significant bits in the upper half.
        for pixel in 0..16 {
            let index = if Self::in_subblock(flip, 0, pixel) {
                first.indices[pixel]
            } else {
                second.indices[pixel]
            };
            let (x, y) = (pixel % 4, pixel / 4);
            let bit = x * 4 + y;
            packed |= ((index >> 1) as u64) << (16 + bit);
            packed |= ((index & 1) as u64) << bit;
        }

        Candidate {
            error: first.error + second.error,
            packed,
        }
    }
}
