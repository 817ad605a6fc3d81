//! Fixed-offset little-endian field access for header layouts

use crate::types::{ContentId, DecoderError, FixedText, Result, SizeContext};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// `version: u16` followed by `header_size: u16`, shared by every layout
const PREAMBLE_LEN: usize = 4;

fn short_header(needed: usize, available: usize) -> DecoderError {
    DecoderError::size_mismatch(SizeContext::Header, needed as u64, available as u64)
}

/// Read the `(version, header_size)` pair every header starts with
pub fn read_preamble(bytes: &[u8]) -> Result<(u16, u16)> {
    let mut reader = FieldReader::new(bytes, PREAMBLE_LEN)?;
    Ok((reader.u16()?, reader.u16()?))
}

/// Sequential reader over one fixed-size header layout
pub(crate) struct FieldReader<'a> {
    cursor: Cursor<&'a [u8]>,
    layout_len: usize,
}

impl<'a> FieldReader<'a> {
    /// Start reading a layout of `layout_len` bytes at the front of `bytes`
    pub(crate) fn new(bytes: &'a [u8], layout_len: usize) -> Result<Self> {
        if bytes.len() < layout_len {
            return Err(short_header(layout_len, bytes.len()));
        }
        Ok(Self {
            cursor: Cursor::new(&bytes[..layout_len]),
            layout_len,
        })
    }

    fn overrun(&self) -> DecoderError {
        short_header(self.cursor.position() as usize + 1, self.layout_len)
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| self.overrun())
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| self.overrun())
    }

    pub(crate) fn i32(&mut self) -> Result<i32> {
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| self.overrun())
    }

    pub(crate) fn u64(&mut self) -> Result<u64> {
        self.cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| self.overrun())
    }

    pub(crate) fn i64(&mut self) -> Result<i64> {
        self.cursor
            .read_i64::<LittleEndian>()
            .map_err(|_| self.overrun())
    }

    pub(crate) fn f32(&mut self) -> Result<f32> {
        self.cursor
            .read_f32::<LittleEndian>()
            .map_err(|_| self.overrun())
    }

    pub(crate) fn f64(&mut self) -> Result<f64> {
        self.cursor
            .read_f64::<LittleEndian>()
            .map_err(|_| self.overrun())
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| self.overrun())?;
        Ok(buf)
    }

    pub(crate) fn content_id(&mut self) -> Result<ContentId> {
        self.array().map(ContentId)
    }

    pub(crate) fn text<const N: usize>(&mut self) -> Result<FixedText<N>> {
        self.array().map(FixedText)
    }

    /// Bytes consumed so far
    pub(crate) fn position(&self) -> usize {
        self.cursor.position() as usize
    }
}

/// Sequential writer producing a canonical header image
pub(crate) struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    pub(crate) fn with_capacity(len: usize) -> Self {
        Self {
            buf: Vec::with_capacity(len),
        }
    }

    pub(crate) fn u16(&mut self, value: u16) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn u32(&mut self, value: u32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn i32(&mut self, value: i32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn u64(&mut self, value: u64) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn i64(&mut self, value: i64) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn f32(&mut self, value: f32) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn f64(&mut self, value: f64) -> &mut Self {
        self.bytes(&value.to_le_bytes())
    }

    pub(crate) fn bytes(&mut self, value: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(value);
        self
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        self.buf
    }
}
