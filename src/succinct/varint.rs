//! LEB128 variable-length unsigned integers.
//!
//! Each byte carries seven data bits, least significant group first. The continuation bit
//! (`0x80`) is set on all bytes but the last one. Therefore values up to 127 occupy a single byte,
//! values up to 16383 two bytes and so on.
use bytes::BufMut;

use crate::error::DecodeFailure;

/// Contains the maximal number of bytes of a varint representing an `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Appends the given value as varint to the given buffer.
///
/// # Example
/// ```
/// # use bytes::BytesMut;
/// # use lectio::succinct::varint::write_varint;
/// let mut buffer = BytesMut::new();
/// write_varint(300, &mut buffer);
///
/// assert_eq!(&buffer[..], &[0xAC, 0x02]);
/// ```
pub fn write_varint(mut value: u64, buffer: &mut impl BufMut) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buffer.put_u8(byte);
            return;
        }
        buffer.put_u8(byte | 0x80);
    }
}

/// Determines the number of bytes required to store the given value as varint.
///
/// # Example
/// ```
/// # use lectio::succinct::varint::varint_len;
/// assert_eq!(varint_len(0), 1);
/// assert_eq!(varint_len(127), 1);
/// assert_eq!(varint_len(128), 2);
/// assert_eq!(varint_len(u64::MAX), 10);
/// ```
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Reads a varint from `data` starting at `*pos` and advances `*pos` past it.
///
/// # Errors
/// Fails with [DecodeFailure::TruncatedVarint] if the data ends before the last byte of the
/// varint and with [DecodeFailure::VarintOverflow] if the value doesn't fit into an `u64`.
///
/// # Example
/// ```
/// # use lectio::succinct::varint::read_varint;
/// let data = [0xAC, 0x02, 0x05];
/// let mut pos = 0;
///
/// assert_eq!(read_varint(&data, &mut pos).unwrap(), 300);
/// assert_eq!(read_varint(&data, &mut pos).unwrap(), 5);
/// assert_eq!(pos, 3);
/// assert!(read_varint(&data, &mut pos).is_err());
/// ```
pub fn read_varint(data: &[u8], pos: &mut usize) -> Result<u64, DecodeFailure> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    let mut index = *pos;
    loop {
        let byte = *data.get(index).ok_or(DecodeFailure::TruncatedVarint)?;
        index += 1;

        let payload = (byte & 0x7F) as u64;
        if shift == 63 && payload > 1 || shift > 63 {
            return Err(DecodeFailure::VarintOverflow);
        }
        result |= payload << shift;

        if byte & 0x80 == 0 {
            *pos = index;
            return Ok(result);
        }
        shift += 7;
    }
}

/// Reads a varint which has to fit into an `u32`.
pub fn read_varint_u32(data: &[u8], pos: &mut usize) -> Result<u32, DecodeFailure> {
    let value = read_varint(data, pos)?;
    u32::try_from(value).map_err(|_| DecodeFailure::VarintOverflow)
}

/// Skips over a varint without computing its value.
pub fn skip_varint(data: &[u8], pos: &mut usize) -> Result<(), DecodeFailure> {
    let mut index = *pos;
    loop {
        let byte = *data.get(index).ok_or(DecodeFailure::TruncatedVarint)?;
        index += 1;
        if byte & 0x80 == 0 {
            *pos = index;
            return Ok(());
        }
        if index - *pos >= MAX_VARINT_LEN {
            return Err(DecodeFailure::VarintOverflow);
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use crate::error::DecodeFailure;
    use crate::succinct::varint::{
        read_varint, read_varint_u32, skip_varint, varint_len, write_varint,
    };

    fn encoded(value: u64) -> BytesMut {
        let mut buffer = BytesMut::new();
        write_varint(value, &mut buffer);
        buffer
    }

    #[test]
    fn values_survive_encoding() {
        for value in [
            0,
            1,
            127,
            128,
            255,
            16_383,
            16_384,
            1_000_000,
            u32::MAX as u64,
            u64::MAX / 2,
            u64::MAX,
        ] {
            let buffer = encoded(value);
            let mut pos = 0;
            assert_eq!(read_varint(&buffer, &mut pos).unwrap(), value);
            assert_eq!(pos, buffer.len());
            assert_eq!(varint_len(value), buffer.len());
        }
    }

    #[test]
    fn single_and_double_byte_boundaries() {
        assert_eq!(&encoded(127)[..], &[0x7F]);
        assert_eq!(&encoded(128)[..], &[0x80, 0x01]);
        assert_eq!(&encoded(16_383)[..], &[0xFF, 0x7F]);
    }

    #[test]
    fn truncated_varints_are_detected() {
        let mut pos = 0;
        assert_eq!(
            read_varint(&[0x80, 0x80], &mut pos),
            Err(DecodeFailure::TruncatedVarint)
        );
        // A failed read must not move the position...
        assert_eq!(pos, 0);
        assert_eq!(
            skip_varint(&[0x80], &mut pos),
            Err(DecodeFailure::TruncatedVarint)
        );
    }

    #[test]
    fn overlong_varints_are_rejected() {
        let data = [0xFF; 11];
        let mut pos = 0;
        assert_eq!(
            read_varint(&data, &mut pos),
            Err(DecodeFailure::VarintOverflow)
        );
        assert_eq!(
            skip_varint(&data, &mut pos),
            Err(DecodeFailure::VarintOverflow)
        );

        let buffer = encoded(u32::MAX as u64 + 1);
        let mut pos = 0;
        assert_eq!(
            read_varint_u32(&buffer, &mut pos),
            Err(DecodeFailure::VarintOverflow)
        );
    }

    #[test]
    fn skipping_matches_reading() {
        let mut buffer = BytesMut::new();
        write_varint(300, &mut buffer);
        write_varint(7, &mut buffer);

        let mut pos = 0;
        skip_varint(&buffer, &mut pos).unwrap();
        assert_eq!(pos, 2);
        assert_eq!(read_varint(&buffer, &mut pos).unwrap(), 7);
    }
}
