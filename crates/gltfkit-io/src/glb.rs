//! GLB binary container.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! header: magic u32 | version u32 | length u32
//! chunk:  length u32 | type u32 | payload (padded to 4 bytes)
//! ```
//!
//! The first chunk is always JSON (padded with spaces); an optional second
//! chunk carries the binary buffer (padded with zeros).

use std::io::{self, Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use tracing::{trace, warn};

use crate::gltf_reader::{GltfError, Result};

pub const GLB_MAGIC: u32 = 0x46546C67; // "glTF"
pub const GLB_VERSION: u32 = 2;
pub const GLB_CHUNK_JSON: u32 = 0x4E4F534A; // "JSON"
pub const GLB_CHUNK_BIN: u32 = 0x004E4942; // "BIN\0"

pub const GLB_HEADER_SIZE: usize = 12;
pub const GLB_CHUNK_HEADER_SIZE: usize = 8;

/// Chunk payloads are padded to this many bytes.
pub const GLB_CHUNK_ALIGNMENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub magic: u32,
    pub version: u32,
    /// Total file length, header included.
    pub length: u32,
}

/// Chunks of a parsed GLB, borrowed from the input.
#[derive(Debug, Clone, Copy)]
pub struct Glb<'a> {
    pub header: GlbHeader,
    /// JSON payload with trailing padding removed.
    pub json: &'a [u8],
    /// Binary payload, padding included.
    pub bin: Option<&'a [u8]>,
}

/// Whether `data` starts with the GLB magic.
pub fn is_glb(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == GLB_MAGIC.to_le_bytes()
}

fn padding(len: usize) -> usize {
    (GLB_CHUNK_ALIGNMENT - len % GLB_CHUNK_ALIGNMENT) % GLB_CHUNK_ALIGNMENT
}

fn read_u32(cursor: &mut Cursor<&[u8]>, what: &str) -> Result<u32> {
    cursor
        .read_u32::<LittleEndian>()
        .map_err(|_| GltfError::InvalidGlb(format!("unexpected end of data reading {}", what)))
}

/// Reads and validates the 12-byte header against `data.len()`.
pub fn read_header(data: &[u8]) -> Result<GlbHeader> {
    if data.len() < GLB_HEADER_SIZE {
        return Err(GltfError::InvalidGlb(format!(
            "{} bytes is too small for a GLB header",
            data.len()
        )));
    }
    let mut cursor = Cursor::new(data);
    let header = GlbHeader {
        magic: read_u32(&mut cursor, "magic")?,
        version: read_u32(&mut cursor, "version")?,
        length: read_u32(&mut cursor, "length")?,
    };

    if header.magic != GLB_MAGIC {
        return Err(GltfError::InvalidGlb(format!(
            "bad magic 0x{:08X}",
            header.magic
        )));
    }
    if header.version < GLB_VERSION {
        return Err(GltfError::InvalidGlb(format!(
            "unsupported GLB version {}",
            header.version
        )));
    }
    if (header.length as usize) > data.len() {
        return Err(GltfError::InvalidGlb(format!(
            "header declares {} bytes but only {} are available",
            header.length,
            data.len()
        )));
    }
    if (header.length as usize) < GLB_HEADER_SIZE {
        return Err(GltfError::InvalidGlb(format!(
            "header declares an impossible length of {}",
            header.length
        )));
    }
    Ok(header)
}

fn read_chunk<'a>(cursor: &mut Cursor<&'a [u8]>) -> Result<(u32, &'a [u8])> {
    let length = read_u32(cursor, "chunk length")? as usize;
    let chunk_type = read_u32(cursor, "chunk type")?;
    let data: &'a [u8] = *cursor.get_ref();
    let start = cursor.position() as usize;
    let end = start
        .checked_add(length)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            GltfError::InvalidGlb(format!(
                "chunk 0x{:08X} of {} bytes extends past the end of the file",
                chunk_type, length
            ))
        })?;
    cursor.set_position(end as u64);
    if length % GLB_CHUNK_ALIGNMENT != 0 {
        warn!(chunk_type, length, "GLB chunk length is not 4-byte aligned");
    }
    trace!(chunk_type, length, "read GLB chunk");
    Ok((chunk_type, &data[start..end]))
}

/// Splits a GLB file into its JSON and optional BIN chunks.
///
/// Bytes past the header's declared length are ignored, as are any chunks
/// after BIN.
pub fn parse(data: &[u8]) -> Result<Glb<'_>> {
    let header = read_header(data)?;
    let data = &data[..header.length as usize];
    let mut cursor = Cursor::new(data);
    cursor.set_position(GLB_HEADER_SIZE as u64);

    if data.len() < GLB_HEADER_SIZE + GLB_CHUNK_HEADER_SIZE {
        return Err(GltfError::InvalidGlb("missing JSON chunk".into()));
    }
    let (json_type, json) = read_chunk(&mut cursor)?;
    if json_type != GLB_CHUNK_JSON {
        return Err(GltfError::InvalidGlb(format!(
            "first chunk has type 0x{:08X}, expected JSON",
            json_type
        )));
    }
    let json_end = json
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    let json = &json[..json_end];

    let mut bin = None;
    let remaining = data.len() - cursor.position() as usize;
    if remaining >= GLB_CHUNK_HEADER_SIZE {
        let (chunk_type, payload) = read_chunk(&mut cursor)?;
        if chunk_type != GLB_CHUNK_BIN {
            return Err(GltfError::InvalidGlb(format!(
                "second chunk has type 0x{:08X}, expected BIN",
                chunk_type
            )));
        }
        bin = Some(payload);
    }

    let trailing = data.len() - cursor.position() as usize;
    if trailing > 0 {
        warn!(bytes = trailing, "ignoring data after the last GLB chunk");
    }

    Ok(Glb { header, json, bin })
}

/// Total file length for the given unpadded payload sizes.
pub fn glb_length(json_len: usize, bin_len: Option<usize>) -> usize {
    let mut length = GLB_HEADER_SIZE + GLB_CHUNK_HEADER_SIZE + json_len + padding(json_len);
    if let Some(bin_len) = bin_len {
        length += GLB_CHUNK_HEADER_SIZE + bin_len + padding(bin_len);
    }
    length
}

fn write_chunk<W: Write>(
    writer: &mut W,
    chunk_type: u32,
    payload: &[u8],
    pad: u8,
) -> io::Result<()> {
    let pad_len = padding(payload.len());
    writer.write_u32::<LittleEndian>((payload.len() + pad_len) as u32)?;
    writer.write_u32::<LittleEndian>(chunk_type)?;
    writer.write_all(payload)?;
    for _ in 0..pad_len {
        writer.write_u8(pad)?;
    }
    Ok(())
}

/// Writes a complete GLB stream. `bin` of `None` omits the BIN chunk.
pub fn write<W: Write>(writer: &mut W, json: &[u8], bin: Option<&[u8]>) -> io::Result<()> {
    let length = glb_length(json.len(), bin.map(<[u8]>::len));
    let length = u32::try_from(length).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} bytes exceeds the 4 GiB GLB limit", length),
        )
    })?;

    writer.write_u32::<LittleEndian>(GLB_MAGIC)?;
    writer.write_u32::<LittleEndian>(GLB_VERSION)?;
    writer.write_u32::<LittleEndian>(length)?;

    write_chunk(writer, GLB_CHUNK_JSON, json, b' ')?;
    if let Some(bin) = bin {
        write_chunk(writer, GLB_CHUNK_BIN, bin, 0)?;
    }
    Ok(())
}

/// [`write`] into a new vector.
pub fn to_vec(json: &[u8], bin: Option<&[u8]>) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(glb_length(json.len(), bin.map(<[u8]>::len)));
    write(&mut out, json, bin)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glb_magic() {
        assert_eq!(&GLB_MAGIC.to_le_bytes(), b"glTF");
        assert_eq!(&GLB_CHUNK_JSON.to_le_bytes(), b"JSON");
        assert_eq!(&GLB_CHUNK_BIN.to_le_bytes(), b"BIN\0");
        assert!(is_glb(b"glTF\x02\x00\x00\x00"));
        assert!(!is_glb(b"{\"asset\""));
        assert!(!is_glb(b"gl"));
    }

    #[test]
    fn test_write_pads_chunks() {
        let glb = to_vec(b"{\"a\":1}", Some(&[1, 2, 3, 4, 5])).unwrap();
        // 12 + (8 + 8) + (8 + 8)
        assert_eq!(glb.len(), 44);
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]), 44);

        // JSON chunk: 7 bytes + 1 space.
        assert_eq!(u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]), 8);
        assert_eq!(glb[27], b' ');

        // BIN chunk: 5 bytes + 3 zeros.
        assert_eq!(u32::from_le_bytes([glb[28], glb[29], glb[30], glb[31]]), 8);
        assert_eq!(&glb[36..44], &[1, 2, 3, 4, 5, 0, 0, 0]);
    }

    #[test]
    fn test_parse_written() {
        let glb = to_vec(b"{}", Some(&[9; 4])).unwrap();
        let parsed = parse(&glb).unwrap();
        assert_eq!(parsed.header.version, 2);
        assert_eq!(parsed.json, b"{}");
        assert_eq!(parsed.bin, Some(&[9u8; 4][..]));

        let glb = to_vec(b"{}", None).unwrap();
        assert_eq!(glb.len(), 24);
        assert!(parse(&glb).unwrap().bin.is_none());
    }

    #[test]
    fn test_header_errors() {
        assert!(matches!(read_header(b"glTF"), Err(GltfError::InvalidGlb(_))));

        let mut glb = to_vec(b"{}", None).unwrap();
        glb[0] = b'x';
        assert!(matches!(parse(&glb), Err(GltfError::InvalidGlb(_))));

        let mut glb = to_vec(b"{}", None).unwrap();
        glb[4] = 1;
        assert!(matches!(parse(&glb), Err(GltfError::InvalidGlb(_))));

        let glb = to_vec(b"{}", None).unwrap();
        assert!(matches!(parse(&glb[..20]), Err(GltfError::InvalidGlb(_))));
    }

    #[test]
    fn test_chunk_errors() {
        // JSON chunk claims more bytes than the file holds.
        let mut glb = to_vec(b"{}", None).unwrap();
        glb[12] = 64;
        assert!(matches!(parse(&glb), Err(GltfError::InvalidGlb(_))));

        // First chunk is BIN.
        let mut glb = to_vec(b"{}", None).unwrap();
        glb[16..20].copy_from_slice(&GLB_CHUNK_BIN.to_le_bytes());
        assert!(matches!(parse(&glb), Err(GltfError::InvalidGlb(_))));

        // Second chunk is neither BIN nor absent.
        let mut glb = to_vec(b"{}", Some(&[0; 4])).unwrap();
        glb[28..32].copy_from_slice(&0x1234_5678u32.to_le_bytes());
        assert!(matches!(parse(&glb), Err(GltfError::InvalidGlb(_))));
    }

    #[test]
    fn test_trailing_nul_padding_tolerated() {
        let mut glb = Vec::new();
        glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&24u32.to_le_bytes());
        glb.extend_from_slice(&4u32.to_le_bytes());
        glb.extend_from_slice(&GLB_CHUNK_JSON.to_le_bytes());
        glb.extend_from_slice(b"{}\0\0");
        assert_eq!(parse(&glb).unwrap().json, b"{}");
    }

    #[test]
    fn test_chunks_after_bin_ignored() {
        let mut glb = to_vec(b"{}", Some(&[7; 4])).unwrap();
        glb.extend_from_slice(&4u32.to_le_bytes());
        glb.extend_from_slice(&0xABCD_0000u32.to_le_bytes());
        glb.extend_from_slice(&[1; 4]);
        let total = glb.len() as u32;
        glb[8..12].copy_from_slice(&total.to_le_bytes());

        let parsed = parse(&glb).unwrap();
        assert_eq!(parsed.bin, Some(&[7u8; 4][..]));
    }
}
