use bytemuck::{Pod, Zeroable};

use crate::error::{Result, TexWrapError};

const MAGIC: [u8; 4] = *b"TWCR";

// lz4 cannot expand data by more than this factor.
const MAX_EXPANSION: usize = 255;

/// Fixed size header in front of every crunched container. All fields little endian.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct RawHeader {
    magic: [u8; 4],
    version: u32,
    mode: i32,
    width: u32,
    height: u32,
    level_count: u32,
    quality: u32,
    payload_size: u32,
    compressed_size: u32,
    reserved: u32,
}

pub(crate) const HEADER_SIZE: usize = std::mem::size_of::<RawHeader>();

/// Decoded container header.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ContainerInfo {
    pub version: u32,
    pub mode: i32,
    pub width: u32,
    pub height: u32,
    pub level_count: u32,
    pub quality: u32,
    /// Size of the block data of all levels once decompressed.
    pub payload_size: u32,
    /// Size of the compressed stream following the header.
    pub compressed_size: u32,
}

impl ContainerInfo {
    /// Total container size in bytes.
    pub fn byte_size(&self) -> usize {
        HEADER_SIZE + self.compressed_size as usize
    }

    fn to_raw(self) -> RawHeader {
        RawHeader {
            magic: MAGIC,
            version: self.version.to_le(),
            mode: self.mode.to_le(),
            width: self.width.to_le(),
            height: self.height.to_le(),
            level_count: self.level_count.to_le(),
            quality: self.quality.to_le(),
            payload_size: self.payload_size.to_le(),
            compressed_size: self.compressed_size.to_le(),
            reserved: 0,
        }
    }

    fn from_raw(raw: RawHeader) -> Self {
        Self {
            version: u32::from_le(raw.version),
            mode: i32::from_le(raw.mode),
            width: u32::from_le(raw.width),
            height: u32::from_le(raw.height),
            level_count: u32::from_le(raw.level_count),
            quality: u32::from_le(raw.quality),
            payload_size: u32::from_le(raw.payload_size),
            compressed_size: u32::from_le(raw.compressed_size),
        }
    }
}

fn malformed(reason: impl Into<String>) -> TexWrapError {
    TexWrapError::codec("crunch", reason)
}

/// Compresses `payload` and prepends the header described by `info`.
///
/// `payload_size` and `compressed_size` of `info` are filled in here.
pub(crate) fn write(mut info: ContainerInfo, payload: &[u8]) -> Result<Vec<u8>> {
    let compressed = lz4_flex::block::compress(payload);

    info.payload_size = u32::try_from(payload.len())
        .map_err(|_| TexWrapError::AllocationFailure { size: payload.len() })?;
    info.compressed_size = u32::try_from(compressed.len()).map_err(|_| {
        TexWrapError::AllocationFailure {
            size: compressed.len(),
        }
    })?;

    let size = info.byte_size();
    let mut container = Vec::new();
    container
        .try_reserve_exact(size)
        .map_err(|_| TexWrapError::AllocationFailure { size })?;
    container.extend_from_slice(bytemuck::bytes_of(&info.to_raw()));
    container.extend_from_slice(&compressed);

    Ok(container)
}

/// Reads and validates the header of `data`.
pub fn read_info(data: &[u8]) -> Result<ContainerInfo> {
    if data.len() < HEADER_SIZE {
        return Err(malformed(format!(
            "{} bytes is too short for a header",
            data.len()
        )));
    }

    let raw: RawHeader = bytemuck::pod_read_unaligned(&data[..HEADER_SIZE]);
    if raw.magic != MAGIC {
        return Err(malformed("bad magic"));
    }

    let info = ContainerInfo::from_raw(raw);
    if info.byte_size() > data.len() {
        return Err(malformed(format!(
            "declared size {} exceeds the {} bytes provided",
            info.byte_size(),
            data.len()
        )));
    }
    if info.payload_size as usize > (info.compressed_size as usize).saturating_mul(MAX_EXPANSION) {
        return Err(malformed("declared payload size is not reachable"));
    }

    Ok(info)
}

/// Validates `data` and returns its header and the decompressed payload.
pub(crate) fn read(data: &[u8]) -> Result<(ContainerInfo, Vec<u8>)> {
    let info = read_info(data)?;
    let compressed = &data[HEADER_SIZE..info.byte_size()];

    let payload = lz4_flex::block::decompress(compressed, info.payload_size as usize)
        .map_err(|error| malformed(error.to_string()))?;
    if payload.len() != info.payload_size as usize {
        return Err(malformed(format!(
            "payload is {} bytes, header declares {}",
            payload.len(),
            info.payload_size
        )));
    }

    Ok((info, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> ContainerInfo {
        ContainerInfo {
            version: 3,
            mode: 28,
            width: 8,
            height: 8,
            level_count: 1,
            quality: 100,
            payload_size: 0,
            compressed_size: 0,
        }
    }

    #[test]
    fn header_is_forty_bytes() {
        assert_eq!(HEADER_SIZE, 40);
    }

    #[test]
    fn write_then_read() {
        let payload: Vec<u8> = (0..32).collect();
        let container = write(info(), &payload).unwrap();

        let (read_back, decoded) = read(&container).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(read_back.version, 3);
        assert_eq!(read_back.payload_size, 32);
        assert_eq!(read_back.byte_size(), container.len());
    }

    #[test]
    fn truncated_and_corrupt_containers_fail() {
        let container = write(info(), &[7u8; 64]).unwrap();

        assert!(read(&container[..HEADER_SIZE - 1]).is_err());
        assert!(read(&container[..container.len() - 1]).is_err());

        let mut bad_magic = container.clone();
        bad_magic[0] = b'X';
        assert!(read(&bad_magic).is_err());

        let mut bad_payload_size = container.clone();
        bad_payload_size[28..32].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(read(&bad_payload_size).is_err());
    }
}
