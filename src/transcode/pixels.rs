use half::f16;

use crate::format::{Channel, PixelLayout, VariableType};

const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Sample {
    Unorm(u32),
    Half,
    Float,
}

impl Sample {
    fn new(bits: u32, variable_type: VariableType) -> Self {
        match (variable_type, bits) {
            (VariableType::SignedFloat, 16) => Sample::Half,
            (VariableType::SignedFloat, 32) => Sample::Float,
            _ => Sample::Unorm(bits),
        }
    }

    fn to_u8(self, raw: u128) -> u8 {
        match self {
            Sample::Unorm(8) => raw as u8,
            Sample::Unorm(bits) => {
                let max = (1u128 << bits) - 1;
                ((raw * 255 + max / 2) / max) as u8
            }
            Sample::Half => float_to_u8(f16::from_bits(raw as u16).to_f32()),
            Sample::Float => float_to_u8(f32::from_bits(raw as u32)),
        }
    }

    /// `threshold` is the rounding offset in `0..1`; 0.5 rounds to nearest.
    fn from_u8(self, value: u8, threshold: f32) -> u128 {
        match self {
            Sample::Unorm(8) => value as u128,
            Sample::Unorm(bits) if bits > 8 => {
                let max = (1u128 << bits) - 1;
                value as u128 * max / 255
            }
            Sample::Unorm(bits) => {
                let max = ((1u32 << bits) - 1) as f32;
                (value as f32 * max / 255.0 + threshold).floor().min(max) as u128
            }
            Sample::Half => f16::from_f32(value as f32 / 255.0).to_bits() as u128,
            Sample::Float => (value as f32 / 255.0).to_bits() as u128,
        }
    }
}

fn float_to_u8(value: f32) -> u8 {
    // NaN saturates to 0.
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Copy, Clone, Debug)]
struct Slot {
    channel: Channel,
    sample: Sample,
    bits: u32,
    shift: u32,
}

impl Slot {
    fn mask(&self) -> u128 {
        (1u128 << self.bits) - 1
    }
}

/// Per channel bit positions of a layout, with the pixel read as one little endian word.
fn slots(layout: &PixelLayout, variable_type: VariableType) -> Vec<Slot> {
    let total = layout.bits_per_pixel();
    let packed = layout.is_packed();
    let mut consumed = 0;

    layout
        .channels()
        .map(|(channel, bits)| {
            // Packed words hold the first channel in the top bits, byte aligned
            // layouts hold it in the first byte.
            let shift = if packed {
                total - consumed - bits
            } else {
                consumed
            };
            consumed += bits;
            Slot {
                channel,
                sample: Sample::new(bits, variable_type),
                bits,
                shift,
            }
        })
        .collect()
}

fn read_le(bytes: &[u8]) -> u128 {
    bytes
        .iter()
        .rev()
        .fold(0, |word, &byte| word << 8 | byte as u128)
}

fn write_le(bytes: &mut [u8], word: u128) {
    for (index, byte) in bytes.iter_mut().enumerate() {
        *byte = (word >> (index * 8)) as u8;
    }
}

/// Unpacks `source` into RGBA8. Channels the layout lacks decode as 0, alpha as 255.
pub(crate) fn unpack_rgba8(
    layout: &PixelLayout,
    variable_type: VariableType,
    source: &[u8],
    rgba: &mut [u8],
) {
    let slots = slots(layout, variable_type);
    let bytes_per_pixel = layout.bytes_per_pixel();

    for (pixel, out) in source
        .chunks_exact(bytes_per_pixel)
        .zip(rgba.chunks_exact_mut(4))
    {
        let word = read_le(pixel);
        out.copy_from_slice(&[0, 0, 0, 255]);
        for slot in &slots {
            out[slot.channel.rgba_index()] = slot.sample.to_u8((word >> slot.shift) & slot.mask());
        }
    }
}

/// Packs RGBA8 into `destination`, optionally with a 4x4 ordered dither on channels
/// narrower than 8 bits.
pub(crate) fn pack_rgba8(
    layout: &PixelLayout,
    variable_type: VariableType,
    rgba: &[u8],
    destination: &mut [u8],
    width: usize,
    dither: bool,
) {
    let slots = slots(layout, variable_type);
    let bytes_per_pixel = layout.bytes_per_pixel();

    for (index, (pixel, out)) in rgba
        .chunks_exact(4)
        .zip(destination.chunks_exact_mut(bytes_per_pixel))
        .enumerate()
    {
        let threshold = if dither {
            let (x, y) = (index % width, index / width);
            (BAYER_4X4[y % 4][x % 4] as f32 + 0.5) / 16.0
        } else {
            0.5
        };

        let mut word = 0u128;
        for slot in &slots {
            let value = pixel[slot.channel.rgba_index()];
            word |= (slot.sample.from_u8(value, threshold) & slot.mask()) << slot.shift;
        }
        write_le(out, word);
    }
}
