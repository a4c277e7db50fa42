/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/3/26
******************************************************************************/

//! FAST presence map handling.
//!
//! The presence map (PMAP) is a bit-packed bitmap that indicates which
//! optional fields are present in a FAST message. On the wire it is a
//! sequence of bytes, each carrying seven payload bits; the high bit of the
//! final byte is the stop bit that delimits the map.
//!
//! A single cursor (`byte_position` + `bit_mask`) walks the map during a
//! write pass (`set_next`) or a read pass (`check_next_field`). [`rewind`]
//! repositions the cursor without touching the stored bits, so the same map
//! can be written and then re-read.
//!
//! [`rewind`]: PresenceMap::rewind

use crate::destination::DataDestination;
use crate::source::DataSource;
use smallvec::{smallvec, SmallVec};
use tracing::debug;

/// The stop bit: set on the terminal byte of every wire encoding.
const STOP_BIT: u8 = 0x80;

/// Mask covering the seven payload bits of an encoded byte.
const DATA_BITS: u8 = 0x7F;

/// The bit mask addressing the first payload bit of a byte.
const START_BYTE_MASK: u8 = 0x40;

/// Bytes kept inline before the backing store spills to the heap.
/// Eight bytes carry 56 presence bits.
const INLINE_BYTE_CAPACITY: usize = 8;

/// FAST presence map.
///
/// Bits are produced with [`set_next`] and consumed in the same order with
/// [`check_next_field`] as fields are encoded or decoded. The backing store
/// holds raw wire bytes, so a decoded map can be inspected without any
/// unpacking step.
///
/// [`set_next`]: PresenceMap::set_next
/// [`check_next_field`]: PresenceMap::check_next_field
#[derive(Debug, Clone)]
pub struct PresenceMap {
    /// Backing bytes; always at least [`INLINE_BYTE_CAPACITY`] long.
    bits: SmallVec<[u8; INLINE_BYTE_CAPACITY]>,
    /// Byte addressed by the cursor.
    byte_position: usize,
    /// Active bit within that byte, walking `0x40` down to `0x01`.
    bit_mask: u8,
}

impl PresenceMap {
    /// Creates a map with room for at least `bit_count` presence bits.
    ///
    /// The backing store is rounded up to ⌈bit_count/7⌉ bytes, never less
    /// than the inline capacity, and zeroed.
    #[must_use]
    pub fn new(bit_count: usize) -> Self {
        let bytes_needed = bit_count.div_ceil(7).max(INLINE_BYTE_CAPACITY);
        Self {
            bits: smallvec![0; bytes_needed],
            byte_position: 0,
            bit_mask: START_BYTE_MASK,
        }
    }

    /// Clears the map and prepares it for `bit_count` presence bits.
    ///
    /// Enlarges the backing store if needed, zeroes every byte, and rewinds
    /// the cursor. Existing capacity is never shrunk.
    pub fn reset(&mut self, bit_count: usize) {
        let bytes_needed = bit_count.div_ceil(7);
        if bytes_needed > self.bits.len() {
            self.bits.resize(bytes_needed, 0);
        }
        self.bits.fill(0);
        self.rewind();
    }

    /// Repositions the cursor to the first bit without clearing anything.
    pub fn rewind(&mut self) {
        self.byte_position = 0;
        self.bit_mask = START_BYTE_MASK;
    }

    /// Number of bytes in the backing store.
    #[must_use]
    pub fn byte_capacity(&self) -> usize {
        self.bits.len()
    }

    /// Records the next presence bit during a write pass.
    ///
    /// The stop bit is never set here; it is applied to the final byte at
    /// [`encode`](PresenceMap::encode) time only.
    pub fn set_next(&mut self, present: bool) {
        if self.byte_position >= self.bits.len() {
            self.grow();
        }
        if present {
            self.bits[self.byte_position] |= self.bit_mask;
        }
        self.advance();
    }

    /// Consumes and returns the next presence bit during a read pass.
    ///
    /// Walking past the decoded length yields `false` rather than failing:
    /// absent trailing bits mean absent fields.
    pub fn check_next_field(&mut self) -> bool {
        let result = self
            .bits
            .get(self.byte_position)
            .is_some_and(|byte| byte & self.bit_mask != 0);
        self.advance();
        result
    }

    /// Checks an arbitrary bit without disturbing the cursor.
    ///
    /// Bit numbers past the backing store read as `false`.
    #[must_use]
    pub fn check_specific_field(&self, bit_number: usize) -> bool {
        let byte = bit_number / 7;
        let mask = START_BYTE_MASK >> (bit_number % 7);
        self.bits.get(byte).is_some_and(|b| b & mask != 0)
    }

    /// Replaces the backing store with `buffer`, zero-padding the remainder,
    /// then rewinds.
    pub fn set_raw(&mut self, buffer: &[u8]) {
        if buffer.len() > self.bits.len() {
            self.bits.resize(buffer.len(), 0);
        }
        self.bits.fill(0);
        self.bits[..buffer.len()].copy_from_slice(buffer);
        self.rewind();
    }

    /// Exposes the backing bytes, including any zeroed tail capacity.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.bits
    }

    /// Number of bytes a wire encoding of this map would occupy.
    ///
    /// Zero for a map whose cursor never moved.
    #[must_use]
    pub fn encode_bytes_needed(&self) -> usize {
        self.last_occupied_byte().map_or(0, |bpos| bpos + 1)
    }

    /// Writes the wire encoding of this map to `destination`.
    ///
    /// Trailing all-zero bytes are trimmed (`bits[0]` is kept even when
    /// zero), the stop bit is set on the final byte, and an untouched map
    /// emits nothing at all.
    pub fn encode(&mut self, destination: &mut dyn DataDestination) {
        let Some(bpos) = self.last_occupied_byte() else {
            return;
        };
        self.bits[bpos] |= STOP_BIT;
        for pos in 0..=bpos {
            destination.put_byte(self.bits[pos]);
        }
    }

    /// Reads a wire-encoded map from `source`, replacing this map's contents.
    ///
    /// Bytes are appended until one carrying the stop bit arrives; the stop
    /// bit is left set in the stored byte, which is harmless because the
    /// cursor only ever addresses payload bits.
    ///
    /// # Returns
    /// `false` when the source ends before the stop bit; the map is left
    /// reset and safe to reuse.
    pub fn decode(&mut self, source: &mut dyn DataSource) -> bool {
        self.reset(0);
        let mut pos = 0;
        loop {
            let Some(byte) = source.get_byte() else {
                self.reset(0);
                return false;
            };
            self.append_byte(&mut pos, byte);
            if byte & STOP_BIT != 0 {
                return true;
            }
        }
    }

    /// Index of the last byte a wire encoding must carry, or `None` for a
    /// map whose cursor never moved.
    fn last_occupied_byte(&self) -> Option<usize> {
        if self.byte_position == 0 && self.bit_mask == START_BYTE_MASK {
            return None;
        }
        let mut bpos = self.byte_position;
        // A cursor resting on a byte boundary has not touched its byte.
        if self.bit_mask == START_BYTE_MASK {
            bpos -= 1;
        }
        bpos = bpos.min(self.bits.len() - 1);
        while bpos > 0 && self.bits[bpos] == 0 {
            bpos -= 1;
        }
        Some(bpos)
    }

    /// Advances the cursor one bit, wrapping to the next byte.
    fn advance(&mut self) {
        self.bit_mask >>= 1;
        if self.bit_mask == 0 {
            self.bit_mask = START_BYTE_MASK;
            self.byte_position += 1;
        }
    }

    /// Stores `byte` at `pos` during decode, enlarging as needed.
    fn append_byte(&mut self, pos: &mut usize, byte: u8) {
        if *pos >= self.bits.len() {
            self.grow();
        }
        self.bits[*pos] = byte;
        *pos += 1;
    }

    /// Enlarges the backing store by one byte.
    fn grow(&mut self) {
        self.bits.push(0);
        debug!(
            byte_capacity = self.bits.len(),
            "presence map grew past its initial size estimate"
        );
    }
}

impl Default for PresenceMap {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PartialEq for PresenceMap {
    /// Two maps are equal when their cursors agree, every fully consumed
    /// byte matches, and the already-consumed bits of the current byte
    /// match. Bits at or after the cursor carry no meaning and are ignored.
    fn eq(&self, other: &Self) -> bool {
        if self.byte_position != other.byte_position || self.bit_mask != other.bit_mask {
            return false;
        }
        for pos in 0..self.byte_position {
            if self.bits.get(pos).copied().unwrap_or(0) != other.bits.get(pos).copied().unwrap_or(0)
            {
                return false;
            }
        }
        // Mask covering the bit positions the cursor has already consumed
        // within the current byte.
        let consumed = (self.bit_mask.wrapping_neg() << 1) & DATA_BITS;
        let lhs = self.bits.get(self.byte_position).copied().unwrap_or(0);
        let rhs = other.bits.get(other.byte_position).copied().unwrap_or(0);
        (lhs ^ rhs) & consumed == 0
    }
}

impl Eq for PresenceMap {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;
    use proptest::prelude::*;

    fn encoded(pmap: &mut PresenceMap) -> Vec<u8> {
        let mut out = Vec::new();
        pmap.encode(&mut out);
        out
    }

    fn write_all(bits: &[bool]) -> PresenceMap {
        let mut pmap = PresenceMap::new(bits.len());
        for &bit in bits {
            pmap.set_next(bit);
        }
        pmap
    }

    #[test]
    fn test_empty_map_encodes_to_nothing() {
        let mut pmap = PresenceMap::new(0);
        assert_eq!(pmap.encode_bytes_needed(), 0);
        assert!(encoded(&mut pmap).is_empty());
    }

    #[test]
    fn test_single_byte_encode() {
        // T F T F F F F -> payload 0x50, stop bit -> 0xD0
        let mut pmap = write_all(&[true, false, true, false, false, false, false]);
        assert_eq!(pmap.encode_bytes_needed(), 1);
        assert_eq!(encoded(&mut pmap), vec![0xD0]);
    }

    #[test]
    fn test_two_byte_encode_alternating() {
        let bits: Vec<bool> = (0..14).map(|i| i % 2 == 0).collect();
        let mut pmap = write_all(&bits);
        // T at 0,2,4,6 -> 0x55; T at 8,10,12 -> 0x2A, stop bit -> 0xAA
        assert_eq!(encoded(&mut pmap), vec![0x55, 0xAA]);
    }

    #[test]
    fn test_trailing_false_bits_are_trimmed() {
        for padding in [0usize, 1, 6, 7, 20] {
            let mut bits = vec![true];
            bits.extend(std::iter::repeat(false).take(padding));
            let mut pmap = write_all(&bits);
            assert_eq!(encoded(&mut pmap), vec![0xC0], "padding {padding}");
        }
    }

    #[test]
    fn test_all_false_map_emits_first_byte() {
        let mut pmap = write_all(&[false, false, false]);
        assert_eq!(encoded(&mut pmap), vec![0x80]);
    }

    #[test]
    fn test_stop_bit_only_on_last_byte() {
        let bits: Vec<bool> = (0..21).map(|i| i % 3 == 0).collect();
        let mut pmap = write_all(&bits);
        let out = encoded(&mut pmap);
        let stops: Vec<usize> = (0..out.len()).filter(|&i| out[i] & 0x80 != 0).collect();
        assert_eq!(stops, vec![out.len() - 1]);
    }

    #[test]
    fn test_decode_two_bytes() {
        let mut source = SliceSource::new(&[0x01, 0xC0]);
        let mut pmap = PresenceMap::new(0);
        assert!(pmap.decode(&mut source));

        // 0x01: six absent fields, then one present.
        for _ in 0..6 {
            assert!(!pmap.check_next_field());
        }
        assert!(pmap.check_next_field());
        // 0xC0: the stop bit is invisible; payload is one present field.
        assert!(pmap.check_next_field());
        for _ in 0..6 {
            assert!(!pmap.check_next_field());
        }
        // Past the decoded length: padding reads as absent.
        assert!(!pmap.check_next_field());
    }

    #[test]
    fn test_decode_truncated_map_resets() {
        let mut source = SliceSource::new(&[0x40]);
        let mut pmap = PresenceMap::new(0);
        assert!(!pmap.decode(&mut source));

        // The failed decode leaves a clean map behind.
        assert!(pmap.raw().iter().all(|&b| b == 0));
        let mut source = SliceSource::new(&[0xC0]);
        assert!(pmap.decode(&mut source));
        assert!(pmap.check_next_field());
    }

    #[test]
    fn test_decode_empty_source_fails() {
        let mut source = SliceSource::new(&[]);
        let mut pmap = PresenceMap::new(0);
        assert!(!pmap.decode(&mut source));
    }

    #[test]
    fn test_check_specific_field_matches_write_order() {
        let bits: Vec<bool> = (0..23).map(|i| i % 4 == 1).collect();
        let pmap = write_all(&bits);
        for (i, &bit) in bits.iter().enumerate() {
            assert_eq!(pmap.check_specific_field(i), bit, "bit {i}");
        }
        assert!(!pmap.check_specific_field(1000));
    }

    #[test]
    fn test_set_raw_round_trip() {
        let mut pmap = PresenceMap::new(0);
        let raw = [0x12, 0x34, 0x56];
        pmap.set_raw(&raw);

        let stored = pmap.raw();
        assert!(stored.len() >= raw.len());
        assert_eq!(&stored[..raw.len()], &raw);
        assert!(stored[raw.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rewind_preserves_bits() {
        let mut pmap = write_all(&[true, false, true]);
        pmap.rewind();
        assert!(pmap.check_next_field());
        assert!(!pmap.check_next_field());
        assert!(pmap.check_next_field());
    }

    #[test]
    fn test_reset_clears_bits() {
        let mut pmap = write_all(&[true, true, true]);
        pmap.reset(3);
        assert!(!pmap.check_next_field());
        assert_eq!(pmap.encode_bytes_needed(), 0);
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let mut pmap = PresenceMap::new(7);
        let before = pmap.byte_capacity();
        for i in 0..(before * 7 + 8) {
            pmap.set_next(i % 2 == 0);
        }
        assert!(pmap.byte_capacity() > before);
    }

    #[test]
    fn test_equality_tracks_consumed_bits() {
        let mut a = PresenceMap::new(14);
        let mut b = PresenceMap::new(14);
        for bit in [true, false, true] {
            a.set_next(bit);
            b.set_next(bit);
        }
        assert_eq!(a, b);

        // A consumed bit that differs breaks equality.
        a.set_next(false);
        b.set_next(true);
        assert_ne!(a, b);

        let c = a.clone();
        assert_eq!(a, c);
        let mut d = a.clone();
        d.rewind();
        assert_ne!(a, d); // differing cursors are never equal
    }

    #[test]
    fn test_equality_ignores_unconsumed_bits() {
        // 0x43 and 0x40 agree on the first two payload bits only.
        let mut a = PresenceMap::new(0);
        let mut b = PresenceMap::new(0);
        a.set_raw(&[0x40]);
        b.set_raw(&[0x43]);
        for _ in 0..2 {
            a.check_next_field();
            b.check_next_field();
        }
        assert_eq!(a, b);

        // Consuming a differing bit makes the difference visible.
        a.check_next_field();
        b.check_next_field();
        for _ in 0..4 {
            a.check_next_field();
            b.check_next_field();
        }
        assert_ne!(a, b);
    }

    #[test]
    fn test_equality_after_raw_copy() {
        let mut a = write_all(&[true, false, false, true, true]);
        let mut b = PresenceMap::new(0);
        let raw: Vec<u8> = a.raw().to_vec();
        b.set_raw(&raw);
        a.rewind();
        assert_eq!(a, b);

        // The copy stays equal as both cursors consume the same bits.
        for _ in 0..5 {
            assert_eq!(a.check_next_field(), b.check_next_field());
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_checks_past_capacity_stay_false() {
        let mut pmap = PresenceMap::new(7);
        let total = pmap.byte_capacity() * 7 + 10;
        for _ in 0..total {
            assert!(!pmap.check_next_field());
        }
    }

    proptest! {
        #[test]
        fn prop_round_trip(bits in proptest::collection::vec(any::<bool>(), 0..200)) {
            let mut pmap = write_all(&bits);
            let wire = encoded(&mut pmap);

            if bits.is_empty() {
                prop_assert!(wire.is_empty());
            } else {
                let mut source = SliceSource::new(&wire);
                let mut decoded = PresenceMap::new(0);
                prop_assert!(decoded.decode(&mut source));
                for (i, &bit) in bits.iter().enumerate() {
                    prop_assert_eq!(decoded.check_next_field(), bit, "bit {}", i);
                }
            }
        }

        #[test]
        fn prop_encode_bytes_needed_matches_encode(
            bits in proptest::collection::vec(any::<bool>(), 0..200)
        ) {
            let mut pmap = write_all(&bits);
            let needed = pmap.encode_bytes_needed();
            prop_assert_eq!(needed, encoded(&mut pmap).len());
        }
    }
}
