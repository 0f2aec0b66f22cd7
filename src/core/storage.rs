//! Byte-level helpers for the snapshot image format.
//!
//! An image is an 8-byte magic, a u32 version, then tagged chunks:
//! `tag: [u8;4]`, `len: u32`, payload. Compressed chunks carry the
//! uncompressed length (u32) ahead of the LZ4 block so readers can skip
//! chunks they do not recognize.

use std::io::{self, Read, Write};

pub const MAGIC: &[u8; 8] = b"BPIMAGE1";
pub const VERSION_V1: u32 = 1;

pub fn compress_lz4(input: &[u8]) -> Vec<u8> {
    lz4_flex::compress(input)
}

pub fn decompress_lz4(input: &[u8], expected_size: usize) -> io::Result<Vec<u8>> {
    lz4_flex::decompress(input, expected_size)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "lz4 decompression failed"))
}

pub fn write_u32_le<W: Write>(w: &mut W, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

pub fn read_exact<const N: usize, R: Read>(r: &mut R) -> io::Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_u32_le<R: Read>(r: &mut R) -> io::Result<u32> {
    Ok(u32::from_le_bytes(read_exact::<4, _>(r)?))
}

/// Write a chunk whose payload is LZ4-compressed and preceded by the
/// uncompressed length (u32).
pub fn write_chunk_lz4<W: Write>(w: &mut W, tag: [u8; 4], payload: &[u8]) -> io::Result<()> {
    let compressed = compress_lz4(payload);
    let total_len = 4u32.saturating_add(
        u32::try_from(compressed.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "chunk too large"))?,
    );

    w.write_all(&tag)?;
    write_u32_le(w, total_len)?;
    write_u32_le(w, payload.len() as u32)?;
    w.write_all(&compressed)
}

pub fn read_chunk_header<R: Read>(r: &mut R) -> io::Result<([u8; 4], u32)> {
    let tag = read_exact::<4, _>(r)?;
    let len = read_u32_le(r)?;
    Ok((tag, len))
}

/// Read the body of an LZ4 chunk whose header was already consumed.
pub fn read_chunk_lz4<R: Read>(r: &mut R, len: u32) -> io::Result<Vec<u8>> {
    let mut take = r.take(len as u64);
    let uncompressed_len = read_u32_le(&mut take)? as usize;
    let mut compressed = Vec::with_capacity((len as usize).saturating_sub(4));
    take.read_to_end(&mut compressed)?;
    decompress_lz4(&compressed, uncompressed_len)
}
