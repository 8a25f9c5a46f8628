//! Variable-Length Integer Reader
//!
//! Debug-info and core-image tables store small integers as a run of
//! bytes, seven value bits each, least significant group first. A set high
//! bit means another byte follows.
//!
//! ```text
//! 300 = 0b10_0101100
//!   byte 0: 1_0101100   (0xAC, continuation)
//!   byte 1: 0_0000010   (0x02, last)
//! ```

use crate::error::{Result, ScanError};

/// Reads one variable-length integer from a byte buffer
pub trait VarIntReader {
    /// Decode the integer starting at `*offset`
    ///
    /// On success `*offset` is moved past the consumed bytes. On error it is
    /// left unchanged.
    fn read_var_integer(&self, buf: &[u8], offset: &mut usize) -> Result<u64>;
}

/// Little-endian base-128 reader
#[derive(Debug, Clone, Copy, Default)]
pub struct Leb128Reader;

const VALUE_MASK: u8 = 0x7F;
const CONTINUATION_BIT: u8 = 0x80;

impl VarIntReader for Leb128Reader {
    fn read_var_integer(&self, buf: &[u8], offset: &mut usize) -> Result<u64> {
        let start = *offset;
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        let mut pos = start;

        loop {
            let Some(&octet) = buf.get(pos) else {
                return Err(ScanError::Truncated { offset: start });
            };
            pos += 1;

            let bits = u64::from(octet & VALUE_MASK);
            if shift >= u64::BITS || (shift > 0 && bits >> (u64::BITS - shift) != 0) {
                return Err(ScanError::VarIntOverflow { offset: start });
            }
            result |= bits << shift;

            if octet & CONTINUATION_BIT == 0 {
                break;
            }
            shift += 7;
        }

        *offset = pos;
        Ok(result)
    }
}

/// Decode one integer with [`Leb128Reader`]
///
/// # Examples
///
/// ```rust
/// use heapscan::varint::read_var_integer;
///
/// let buf = [0xAC, 0x02, 0x05];
/// let mut offset = 0;
/// assert_eq!(read_var_integer(&buf, &mut offset).unwrap(), 300);
/// assert_eq!(read_var_integer(&buf, &mut offset).unwrap(), 5);
/// assert_eq!(offset, 3);
/// ```
pub fn read_var_integer(buf: &[u8], offset: &mut usize) -> Result<u64> {
    Leb128Reader.read_var_integer(buf, offset)
}
