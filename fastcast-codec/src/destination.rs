/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! Byte-at-a-time output seam for the codec.

use bytes::{BufMut, BytesMut};

/// A destination for encoded bytes.
///
/// Encoding cannot fail: destinations absorb every byte they are given.
pub trait DataDestination {
    /// Appends one byte to the output.
    fn put_byte(&mut self, byte: u8);
}

impl DataDestination for Vec<u8> {
    fn put_byte(&mut self, byte: u8) {
        self.push(byte);
    }
}

impl DataDestination for BytesMut {
    fn put_byte(&mut self, byte: u8) {
        self.put_u8(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_destination() {
        let mut out = Vec::new();
        out.put_byte(0x40);
        out.put_byte(0x80);
        assert_eq!(out, vec![0x40, 0x80]);
    }

    #[test]
    fn test_bytes_mut_destination() {
        let mut out = BytesMut::new();
        out.put_byte(0xC0);
        assert_eq!(&out[..], &[0xC0]);
    }
}
