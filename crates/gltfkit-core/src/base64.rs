//! Base64 and `data:` URI codecs for embedded glTF buffers and images.
//!
//! Uses the standard RFC 4648 alphabet (`+`, `/`) with `=` padding. Decoding
//! tolerates embedded line breaks and missing trailing padding.

use crate::error::{ModelError, Result};

const ENCODE_TABLE: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// MIME type used when embedding buffers.
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

const INVALID: u8 = 0xFF;

const fn build_decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 64 {
        table[ENCODE_TABLE[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const DECODE_TABLE: [u8; 256] = build_decode_table();

/// Encode bytes as padded base64 text.
pub fn encode(data: &[u8]) -> String {
    let mut output = String::with_capacity((data.len() + 2) / 3 * 4);

    for chunk in data.chunks(3) {
        let b1 = chunk[0];
        let b2 = chunk.get(1).copied().unwrap_or(0);
        let b3 = chunk.get(2).copied().unwrap_or(0);

        let n = ((b1 as u32) << 16) | ((b2 as u32) << 8) | (b3 as u32);

        output.push(ENCODE_TABLE[((n >> 18) & 0x3F) as usize] as char);
        output.push(ENCODE_TABLE[((n >> 12) & 0x3F) as usize] as char);

        if chunk.len() > 1 {
            output.push(ENCODE_TABLE[((n >> 6) & 0x3F) as usize] as char);
        } else {
            output.push('=');
        }

        if chunk.len() > 2 {
            output.push(ENCODE_TABLE[(n & 0x3F) as usize] as char);
        } else {
            output.push('=');
        }
    }

    output
}

/// Decode base64 text into bytes.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let mut symbols: Vec<u8> = input
        .bytes()
        .filter(|b| !matches!(b, b'\n' | b'\r' | b' ' | b'\t'))
        .collect();

    // Strip at most two trailing pad characters.
    let mut padding = 0;
    while padding < 2 && symbols.last() == Some(&b'=') {
        symbols.pop();
        padding += 1;
    }

    if symbols.len() % 4 == 1 {
        return Err(ModelError::Base64(format!(
            "invalid length {} (dangling symbol)",
            symbols.len() + padding
        )));
    }

    let mut output = Vec::with_capacity(symbols.len() * 3 / 4);

    for (chunk_idx, chunk) in symbols.chunks(4).enumerate() {
        let mut n: u32 = 0;
        for (i, &byte) in chunk.iter().enumerate() {
            let value = DECODE_TABLE[byte as usize];
            if value == INVALID {
                return Err(ModelError::Base64(format!(
                    "invalid character {:?} at position {}",
                    byte as char,
                    chunk_idx * 4 + i
                )));
            }
            n |= (value as u32) << (18 - 6 * i);
        }

        output.push((n >> 16) as u8);
        if chunk.len() > 2 {
            output.push((n >> 8) as u8);
        }
        if chunk.len() > 3 {
            output.push(n as u8);
        }
    }

    Ok(output)
}

/// Build a `data:<mime>;base64,<payload>` URI.
pub fn encode_data_uri(data: &[u8], mime_type: &str) -> String {
    let mut uri = String::with_capacity(mime_type.len() + 13 + (data.len() + 2) / 3 * 4);
    uri.push_str("data:");
    uri.push_str(mime_type);
    uri.push_str(";base64,");
    uri.push_str(&encode(data));
    uri
}

/// Returns true if `uri` uses the `data:` scheme.
pub fn is_data_uri(uri: &str) -> bool {
    uri.starts_with("data:")
}

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Media type, empty when the URI omits it.
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Parse a `data:[<mediatype>][;base64],<data>` URI.
///
/// Non-base64 payloads are percent-decoded.
pub fn decode_data_uri(uri: &str) -> Result<DataUri> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ModelError::DataUri("missing data: scheme".into()))?;

    let comma_pos = rest
        .find(',')
        .ok_or_else(|| ModelError::DataUri("no comma".into()))?;

    let header = &rest[..comma_pos];
    let payload = &rest[comma_pos + 1..];

    let (mime_type, is_base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };
    // Drop media type parameters such as `;charset=...`.
    let mime_type = mime_type.split(';').next().unwrap_or_default().to_string();

    let data = if is_base64 {
        decode(payload)?
    } else {
        percent_decode(payload)
    };

    Ok(DataUri { mime_type, data })
}

fn percent_decode(input: &str) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let bytes = input.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_digit(bytes[i + 1]), hex_digit(bytes[i + 2])) {
                output.push((h << 4) | l);
                i += 3;
                continue;
            }
        }
        output.push(bytes[i]);
        i += 1;
    }

    output
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
