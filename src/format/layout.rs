/// A colour channel of an uncompressed pixel layout.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl Channel {
    const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'r' => Some(Channel::Red),
            b'g' => Some(Channel::Green),
            b'b' => Some(Channel::Blue),
            b'a' => Some(Channel::Alpha),
            _ => None,
        }
    }

    /// Position of the channel inside an RGBA8 pixel.
    pub const fn rgba_index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
            Channel::Alpha => 3,
        }
    }
}

/// An uncompressed pixel layout: up to four named channels with their bit widths.
///
/// Layouts whose channels are all whole bytes are stored channel after channel in the
/// order given, multi-byte channels little endian. Layouts with sub-byte channels are
/// packed into a single little endian word, the first channel in the most significant
/// bits (`rgb 565` keeps red in bits 11..16).
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct PixelLayout {
    tags: [u8; 4],
    bits: [u8; 4],
}

impl PixelLayout {
    pub const fn new(tags: [u8; 4], bits: [u8; 4]) -> Self {
        Self { tags, bits }
    }

    /// The 64-bit generic pixel id: channel tags in the low four bytes, widths in the high four.
    pub const fn pixel_id(&self) -> u64 {
        let mut id = 0u64;
        let mut index = 0;
        while index < 4 {
            id |= (self.tags[index] as u64) << (index * 8);
            id |= (self.bits[index] as u64) << (32 + index * 8);
            index += 1;
        }
        id
    }

    /// Channels in storage order with their widths.
    pub fn channels(&self) -> impl Iterator<Item = (Channel, u32)> + '_ {
        self.tags
            .iter()
            .zip(self.bits.iter())
            .filter_map(|(&tag, &bits)| Channel::from_tag(tag).map(|c| (c, bits as u32)))
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.channels().map(|(_, bits)| bits).sum()
    }

    pub fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel() as usize + 7) / 8
    }

    /// True when at least one channel does not start on a byte boundary.
    pub fn is_packed(&self) -> bool {
        self.channels().any(|(_, bits)| bits % 8 != 0)
    }

    /// Byte size of a `width * height` image in this layout.
    pub fn data_size(&self, width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(self.bytes_per_pixel())
    }
}
