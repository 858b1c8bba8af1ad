//! Canonical network-order field encodings.

use bytes::{Buf, BufMut};

use crate::error::{CodecError, CodecResult};
use crate::value::{Quat, Vec3, Vec3d};

/// Maximum byte length of an encoded string field (16-bit length prefix).
pub const MAX_STRING_FIELD_LEN: usize = u16::MAX as usize;

/// Checked reader over a field payload.
///
/// All multi-byte reads are network byte order. Every read validates the
/// remaining length first, so corrupt datagrams surface as
/// [`CodecError::UnexpectedEnd`] instead of a panic.
pub struct FieldReader<'a> {
    buf: &'a [u8],
}

impl<'a> FieldReader<'a> {
    /// Creates a reader over `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Returns true when every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn ensure(&self, needed: usize) -> CodecResult<()> {
        if self.buf.len() < needed {
            return Err(CodecError::UnexpectedEnd {
                needed,
                remaining: self.buf.len(),
            });
        }
        Ok(())
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> CodecResult<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> CodecResult<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16())
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> CodecResult<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32())
    }

    /// Reads a big-endian `u64`.
    pub fn read_u64(&mut self) -> CodecResult<u64> {
        self.ensure(8)?;
        Ok(self.buf.get_u64())
    }

    /// Reads a big-endian `i32`.
    pub fn read_i32(&mut self) -> CodecResult<i32> {
        self.ensure(4)?;
        Ok(self.buf.get_i32())
    }

    /// Reads a big-endian `i64`.
    pub fn read_i64(&mut self) -> CodecResult<i64> {
        self.ensure(8)?;
        Ok(self.buf.get_i64())
    }

    /// Reads a big-endian `f32`.
    pub fn read_f32(&mut self) -> CodecResult<f32> {
        self.ensure(4)?;
        Ok(self.buf.get_f32())
    }

    /// Reads a big-endian `f64`.
    pub fn read_f64(&mut self) -> CodecResult<f64> {
        self.ensure(8)?;
        Ok(self.buf.get_f64())
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        self.ensure(len)?;
        let buf = self.buf;
        let (head, tail) = buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }
}

/// Canonical binary encoding for one field type.
///
/// Encodings are fixed width except strings, which carry a 16-bit length
/// prefix. All integers and floats are network byte order.
pub trait FieldCodec: Sized {
    /// Appends this value's canonical encoding to `buf`.
    fn encode(&self, buf: &mut Vec<u8>) -> CodecResult<()>;

    /// Decodes one value from `reader`.
    fn decode(reader: &mut FieldReader<'_>) -> CodecResult<Self>;
}

macro_rules! numeric_field_codec {
    ($($ty:ty => $put:ident, $read:ident;)+) => {
        $(impl FieldCodec for $ty {
            fn encode(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
                buf.$put(*self);
                Ok(())
            }

            fn decode(reader: &mut FieldReader<'_>) -> CodecResult<Self> {
                reader.$read()
            }
        })+
    };
}

numeric_field_codec! {
    u8 => put_u8, read_u8;
    u16 => put_u16, read_u16;
    u32 => put_u32, read_u32;
    u64 => put_u64, read_u64;
    i32 => put_i32, read_i32;
    i64 => put_i64, read_i64;
    f32 => put_f32, read_f32;
    f64 => put_f64, read_f64;
}

impl FieldCodec for bool {
    fn encode(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        buf.put_u8(u8::from(*self));
        Ok(())
    }

    fn decode(reader: &mut FieldReader<'_>) -> CodecResult<Self> {
        Ok(reader.read_u8()? != 0)
    }
}

impl FieldCodec for String {
    fn encode(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        let bytes = self.as_bytes();
        if bytes.len() > MAX_STRING_FIELD_LEN {
            return Err(CodecError::StringTooLong {
                len: bytes.len(),
                max: MAX_STRING_FIELD_LEN,
            });
        }
        buf.put_u16(bytes.len() as u16);
        buf.put_slice(bytes);
        Ok(())
    }

    fn decode(reader: &mut FieldReader<'_>) -> CodecResult<Self> {
        let len = reader.read_u16()? as usize;
        let bytes = reader.read_bytes(len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
        Ok(text.to_string())
    }
}

impl FieldCodec for Vec3 {
    fn encode(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        buf.put_f32(self.x);
        buf.put_f32(self.y);
        buf.put_f32(self.z);
        Ok(())
    }

    fn decode(reader: &mut FieldReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
        })
    }
}

impl FieldCodec for Vec3d {
    fn encode(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        buf.put_f64(self.x);
        buf.put_f64(self.y);
        buf.put_f64(self.z);
        Ok(())
    }

    fn decode(reader: &mut FieldReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            x: reader.read_f64()?,
            y: reader.read_f64()?,
            z: reader.read_f64()?,
        })
    }
}

impl FieldCodec for Quat {
    fn encode(&self, buf: &mut Vec<u8>) -> CodecResult<()> {
        buf.put_f32(self.x);
        buf.put_f32(self.y);
        buf.put_f32(self.z);
        buf.put_f32(self.w);
        Ok(())
    }

    fn decode(reader: &mut FieldReader<'_>) -> CodecResult<Self> {
        Ok(Self {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
            z: reader.read_f32()?,
            w: reader.read_f32()?,
        })
    }
}
