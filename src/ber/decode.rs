//! BER decoding.
//!
//! Zero-copy decoding over `Bytes`. Every violation of the expected wire
//! format is a distinct `Error::Decode { offset, kind }`; the decoder never
//! panics on hostile input.

use super::length::decode_length;
use super::tag;
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
pub struct Decoder {
    data: Bytes,
    offset: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self { data, offset: 0 }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Get the current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if all input has been consumed.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Fail unless the input was fully consumed.
    ///
    /// Constructed decoding is driven by consumed bytes against the declared
    /// outer length, so leftover bytes mean a malformed structure.
    pub fn expect_end(&self) -> Result<()> {
        if !self.is_empty() {
            tracing::debug!(target: "snmpt::ber", offset = self.offset, remaining = self.remaining(), "trailing bytes after structure");
            return Err(Error::decode(
                self.offset,
                DecodeErrorKind::TrailingData {
                    remaining: self.remaining(),
                },
            ));
        }
        Ok(())
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        if self.offset >= self.data.len() {
            return Err(Error::decode(self.offset, DecodeErrorKind::TruncatedData));
        }
        let byte = self.data[self.offset];
        self.offset += 1;
        Ok(byte)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// Read a length field.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset)?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        // saturating_add so a hostile length cannot wrap past the bounds check
        if self.offset.saturating_add(len) > self.data.len() {
            tracing::debug!(target: "snmpt::ber", offset = self.offset, needed = len, available = self.remaining(), "declared length exceeds buffer");
            return Err(Error::decode(self.offset, DecodeErrorKind::TruncatedData));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let tag = self.read_tag()?;
        if tag != expected {
            return Err(Error::decode(
                self.offset - 1,
                DecodeErrorKind::UnexpectedTag {
                    expected,
                    actual: tag,
                },
            ));
        }
        self.read_length()
    }

    /// Read a BER INTEGER (signed, up to 8 bytes).
    pub fn read_integer(&mut self) -> Result<i64> {
        let len = self.expect_tag(tag::universal::INTEGER)?;
        self.read_integer_value(len)
    }

    /// Read an INTEGER constrained to i32 (request-id, error-status fields).
    pub fn read_int32(&mut self) -> Result<i32> {
        let offset = self.offset;
        let value = self.read_integer()?;
        i32::try_from(value).map_err(|_| Error::decode(offset, DecodeErrorKind::IntegerOverflow))
    }

    /// Read integer content given the length.
    pub fn read_integer_value(&mut self, len: usize) -> Result<i64> {
        if len == 0 {
            return Err(Error::decode(self.offset, DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 8 {
            return Err(Error::decode(
                self.offset,
                DecodeErrorKind::IntegerTooLong { length: len, max: 8 },
            ));
        }

        let bytes = self.read_bytes(len)?;

        // Sign extend from the first content byte
        let mut value: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        for &byte in bytes.iter() {
            value = (value << 8) | i64::from(byte);
        }

        Ok(value)
    }

    /// Read an unsigned 32-bit integer with a specific application tag.
    pub fn read_unsigned32(&mut self, expected_tag: u8) -> Result<u32> {
        let len = self.expect_tag(expected_tag)?;
        self.read_unsigned32_value(len)
    }

    /// Read unsigned 32-bit content given the length.
    ///
    /// Up to 5 bytes: one optional leading zero plus 4 value bytes.
    pub fn read_unsigned32_value(&mut self, len: usize) -> Result<u32> {
        if len == 0 {
            return Err(Error::decode(self.offset, DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 5 {
            return Err(Error::decode(
                self.offset,
                DecodeErrorKind::IntegerTooLong { length: len, max: 5 },
            ));
        }

        let offset = self.offset;
        let bytes = self.read_bytes(len)?;
        let mut value: u64 = 0;
        for &byte in bytes.iter() {
            value = (value << 8) | u64::from(byte);
        }

        u32::try_from(value).map_err(|_| Error::decode(offset, DecodeErrorKind::IntegerOverflow))
    }

    /// Read a Counter64 content given the length.
    ///
    /// Up to 9 bytes: one optional leading zero plus 8 value bytes.
    pub fn read_unsigned64_value(&mut self, len: usize) -> Result<u64> {
        if len == 0 {
            return Err(Error::decode(self.offset, DecodeErrorKind::ZeroLengthInteger));
        }
        if len > 9 {
            return Err(Error::decode(
                self.offset,
                DecodeErrorKind::IntegerTooLong { length: len, max: 9 },
            ));
        }

        let offset = self.offset;
        let bytes = self.read_bytes(len)?;
        if len == 9 && bytes[0] != 0 {
            return Err(Error::decode(offset, DecodeErrorKind::IntegerOverflow));
        }
        let mut value: u64 = 0;
        for &byte in bytes.iter() {
            value = (value << 8) | u64::from(byte);
        }

        Ok(value)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        self.read_bytes(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return Err(Error::decode(self.offset, DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        self.read_oid_value(len)
    }

    /// Read OID content given a pre-read length.
    pub fn read_oid_value(&mut self, len: usize) -> Result<Oid> {
        let offset = self.offset;
        let bytes = self.read_bytes(len)?;
        Oid::from_ber(&bytes).map_err(|e| match e {
            Error::Decode { kind, .. } => Error::decode(offset, kind),
            other => other,
        })
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for
    /// its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
        })
    }
}
