//! Fixed-width big-endian integer helpers and a bounds-checked reader.

use hforge_types::{CodecError, CodecResult};

/// Largest value representable in a 24-bit length field.
pub const MAX_U24: usize = 0xFF_FFFF;

/// Encode a u16 as 2 big-endian bytes.
pub fn encode_u16(v: u16) -> [u8; 2] {
    v.to_be_bytes()
}

/// Decode 2 big-endian bytes.
pub fn decode_u16(b: [u8; 2]) -> u16 {
    u16::from_be_bytes(b)
}

/// Encode the low 24 bits of `v` as 3 big-endian bytes.
///
/// Callers check `v <= MAX_U24` first; the high byte is discarded.
pub fn encode_u24(v: u32) -> [u8; 3] {
    [(v >> 16) as u8, (v >> 8) as u8, v as u8]
}

/// Decode 3 big-endian bytes.
pub fn decode_u24(b: [u8; 3]) -> u32 {
    ((b[0] as u32) << 16) | ((b[1] as u32) << 8) | (b[2] as u32)
}

/// Append `data` preceded by a 1-byte length.
pub fn put_vec8(buf: &mut Vec<u8>, field: &'static str, data: &[u8]) -> CodecResult<()> {
    let len = u8::try_from(data.len()).map_err(|_| CodecError::FieldTooLarge {
        field,
        len: data.len(),
        max: u8::MAX as usize,
    })?;
    buf.push(len);
    buf.extend_from_slice(data);
    Ok(())
}

/// Append `data` preceded by a 2-byte length.
pub fn put_vec16(buf: &mut Vec<u8>, field: &'static str, data: &[u8]) -> CodecResult<()> {
    let len = u16::try_from(data.len()).map_err(|_| CodecError::FieldTooLarge {
        field,
        len: data.len(),
        max: u16::MAX as usize,
    })?;
    buf.extend_from_slice(&encode_u16(len));
    buf.extend_from_slice(data);
    Ok(())
}

/// Cursor over a borrowed byte slice.
///
/// Every short read fails with `TruncatedInput` carrying the reader's
/// context label, so callers never index past the end of the input.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    context: &'static str,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8], context: &'static str) -> Self {
        Self {
            data,
            pos: 0,
            context,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the input.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn read_bytes(&mut self, n: usize) -> CodecResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::truncated(self.context, n, self.remaining()));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> CodecResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> CodecResult<u16> {
        Ok(decode_u16(self.read_array()?))
    }

    pub fn read_u24(&mut self) -> CodecResult<u32> {
        Ok(decode_u24(self.read_array()?))
    }

    /// Read a vector with a 1-byte length prefix.
    pub fn read_vec8(&mut self) -> CodecResult<&'a [u8]> {
        let len = self.read_u8()? as usize;
        self.read_bytes(len)
    }

    /// Read a vector with a 2-byte length prefix.
    pub fn read_vec16(&mut self) -> CodecResult<&'a [u8]> {
        let len = self.read_u16()? as usize;
        self.read_bytes(len)
    }

    /// Fail unless the input has been fully consumed.
    pub fn finish(&self) -> CodecResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CodecError::malformed(
                self.context,
                format!("{} trailing bytes", self.remaining()),
            ))
        }
    }
}

/// Split a 2-byte code list (groups, signature schemes, versions) into codes.
pub(crate) fn read_u16_list(data: &[u8], context: &'static str) -> CodecResult<Vec<u16>> {
    if data.len() % 2 != 0 {
        return Err(CodecError::malformed(
            context,
            format!("odd code list length {}", data.len()),
        ));
    }
    Ok(data
        .chunks_exact(2)
        .map(|c| decode_u16([c[0], c[1]]))
        .collect())
}
