//! Bounds-checked cursor over one message body.
//!
//! All fixed-width values are big-endian (network order). A failed read
//! never moves the cursor, so a caller can abandon the whole message and
//! still know exactly where it started.

use crate::{DecodeError, DecodeLimits, DecodeResult};
use trowel_nbt::{NbtError, NbtValue};
use trowel_types::{BlockPos, Identifier, ItemStack};
use uuid::Uuid;

const SEGMENT_BITS: u8 = 0x7F;
const CONTINUE_BIT: u8 = 0x80;

/// Longest legal encoding of an i32 VarInt.
pub const MAX_VARINT_BYTES: usize = 5;
/// Longest legal encoding of an i64 VarLong.
pub const MAX_VARLONG_BYTES: usize = 10;

/// Protocol string cap (in UTF-16 units) for fields without a tighter one.
pub const DEFAULT_STRING_LEN: usize = 32767;

#[derive(Debug, Clone)]
pub struct DataBuffer<'a> {
    data: &'a [u8],
    offset: usize,
    limits: DecodeLimits,
}

impl<'a> DataBuffer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, DecodeLimits::default())
    }

    pub fn with_limits(data: &'a [u8], limits: DecodeLimits) -> Self {
        Self {
            data,
            offset: 0,
            limits,
        }
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total length of the underlying bytes, consumed or not.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    /// The unread bytes, without consuming them.
    pub fn peek_remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }

    /// Run `f`, rewinding to the current offset if it fails. Composite reads
    /// (length prefix + payload) go through here to keep failures atomic.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> DecodeResult<T>,
    ) -> DecodeResult<T> {
        let start = self.offset;
        let result = f(self);
        if result.is_err() {
            self.offset = start;
        }
        result
    }

    fn ensure(&self, requested: usize) -> DecodeResult<()> {
        if self.remaining() < requested {
            return Err(DecodeError::OutOfBounds {
                requested,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        self.take_array().map(u16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        self.take_array().map(u32::from_be_bytes)
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        self.take_array().map(u64::from_be_bytes)
    }

    pub fn read_i8(&mut self) -> DecodeResult<i8> {
        self.take_array().map(i8::from_be_bytes)
    }

    pub fn read_i16(&mut self) -> DecodeResult<i16> {
        self.take_array().map(i16::from_be_bytes)
    }

    pub fn read_i32(&mut self) -> DecodeResult<i32> {
        self.take_array().map(i32::from_be_bytes)
    }

    pub fn read_i64(&mut self) -> DecodeResult<i64> {
        self.take_array().map(i64::from_be_bytes)
    }

    pub fn read_f32(&mut self) -> DecodeResult<f32> {
        self.take_array().map(f32::from_be_bytes)
    }

    pub fn read_f64(&mut self) -> DecodeResult<f64> {
        self.take_array().map(f64::from_be_bytes)
    }

    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Angle in 256ths of a full turn.
    pub fn read_angle(&mut self) -> DecodeResult<u8> {
        self.read_u8()
    }

    /// Read a VarInt. Running out of input is `OutOfBounds`; a fifth byte
    /// that still carries the continuation bit is `VarIntTooBig`.
    pub fn read_varint(&mut self) -> DecodeResult<i32> {
        let mut value: i32 = 0;
        for i in 0..MAX_VARINT_BYTES {
            let byte = self.byte_at(i)?;
            value |= i32::from(byte & SEGMENT_BITS) << (7 * i);
            if byte & CONTINUE_BIT == 0 {
                self.offset += i + 1;
                return Ok(value);
            }
        }
        Err(DecodeError::VarIntTooBig)
    }

    pub fn read_varlong(&mut self) -> DecodeResult<i64> {
        let mut value: i64 = 0;
        for i in 0..MAX_VARLONG_BYTES {
            let byte = self.byte_at(i)?;
            value |= i64::from(byte & SEGMENT_BITS) << (7 * i);
            if byte & CONTINUE_BIT == 0 {
                self.offset += i + 1;
                return Ok(value);
            }
        }
        Err(DecodeError::VarLongTooBig)
    }

    fn byte_at(&self, i: usize) -> DecodeResult<u8> {
        self.data
            .get(self.offset + i)
            .copied()
            .ok_or(DecodeError::OutOfBounds {
                requested: i + 1,
                remaining: self.remaining(),
            })
    }

    fn read_length(&mut self) -> DecodeResult<usize> {
        let len = self.read_varint()?;
        if len < 0 {
            return Err(DecodeError::NegativeLength(len));
        }
        Ok(len as usize)
    }

    /// Read a varint-prefixed UTF-8 string of at most `max_len` UTF-16 units.
    pub fn read_string(&mut self, max_len: usize) -> DecodeResult<String> {
        self.transaction(|buf| {
            let len = buf.read_length()?;
            let max = max_len.saturating_mul(4).min(buf.limits.max_string_bytes);
            if len > max {
                return Err(DecodeError::StringTooLong { len, max });
            }
            let bytes = buf.take(len)?;
            let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
            if text.encode_utf16().count() > max_len {
                return Err(DecodeError::StringTooLong { len, max: max_len });
            }
            Ok(text.to_owned())
        })
    }

    pub fn read_identifier(&mut self) -> DecodeResult<Identifier> {
        self.transaction(|buf| {
            let raw = buf.read_string(DEFAULT_STRING_LEN)?;
            raw.parse().map_err(DecodeError::InvalidIdentifier)
        })
    }

    /// Read a varint-prefixed byte array of at most `max_len` bytes.
    pub fn read_byte_array(&mut self, max_len: usize) -> DecodeResult<Vec<u8>> {
        self.transaction(|buf| {
            let len = buf.read_length()?;
            let max = max_len.min(buf.limits.max_byte_array);
            if len > max {
                return Err(DecodeError::ByteArrayTooLong { len, max });
            }
            Ok(buf.take(len)?.to_vec())
        })
    }

    /// Borrow the next `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        self.take(n)
    }

    pub fn read_fixed<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        self.take_array()
    }

    /// Consume everything left. Used by packets whose last field runs to the
    /// end of the message (plugin channel payloads).
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let rest = &self.data[self.offset..];
        self.offset = self.data.len();
        rest
    }

    pub fn skip(&mut self, n: usize) -> DecodeResult<()> {
        self.take(n).map(|_| ())
    }

    /// Split off the next `n` bytes as their own cursor, sharing the limits.
    pub fn sub_buffer(&mut self, n: usize) -> DecodeResult<DataBuffer<'a>> {
        let data = self.take(n)?;
        Ok(DataBuffer::with_limits(data, self.limits))
    }

    pub fn read_uuid(&mut self) -> DecodeResult<Uuid> {
        self.take_array().map(Uuid::from_bytes)
    }

    pub fn read_position(&mut self) -> DecodeResult<BlockPos> {
        self.read_u64().map(BlockPos::decode)
    }

    /// Read a varint count followed by that many elements.
    pub fn read_array<T>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> DecodeResult<T>,
    ) -> DecodeResult<Vec<T>> {
        self.transaction(|buf| {
            let len = buf.read_length()?;
            let max = buf.limits.max_array_len;
            if len > max {
                return Err(DecodeError::ArrayTooLong { len, max });
            }
            let mut items = Vec::with_capacity(len.min(buf.remaining()));
            for _ in 0..len {
                items.push(read(buf)?);
            }
            Ok(items)
        })
    }

    /// Read a boolean presence flag, then the value if present.
    pub fn read_option<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> DecodeResult<T>,
    ) -> DecodeResult<Option<T>> {
        self.transaction(|buf| {
            if buf.read_bool()? {
                read(buf).map(Some)
            } else {
                Ok(None)
            }
        })
    }

    /// A length-prefixed array of longs (`BitSet` on the wire).
    pub fn read_bitset(&mut self) -> DecodeResult<Vec<i64>> {
        self.read_array(|buf| buf.read_i64())
    }

    /// Read nameless network NBT; TAG_End yields `None`. Running out of
    /// input mid-tag is `OutOfBounds`, like any other read.
    pub fn read_optional_nbt(&mut self) -> DecodeResult<Option<NbtValue>> {
        let mut rest = &self.data[self.offset..];
        let before = rest.len();
        let value = NbtValue::read_root_network(&mut rest).map_err(|e| match e {
            NbtError::NotEnoughData { needed, remaining } => DecodeError::OutOfBounds {
                requested: needed,
                remaining,
            },
            other => DecodeError::Nbt(other),
        })?;
        self.offset += before - rest.len();
        Ok(value)
    }

    pub fn read_nbt(&mut self) -> DecodeResult<NbtValue> {
        self.transaction(|buf| {
            buf.read_optional_nbt()?
                .ok_or(DecodeError::Nbt(NbtError::UnexpectedEnd))
        })
    }

    /// Read an item slot (1.21 component format). Removed-component ids are
    /// skipped; added components cannot be decoded and fail the read.
    pub fn read_slot(&mut self) -> DecodeResult<Option<ItemStack>> {
        self.transaction(|buf| {
            let item_count = buf.read_varint()?;
            if item_count <= 0 {
                return Ok(None);
            }
            let count = i8::try_from(item_count).map_err(|_| DecodeError::InvalidValue {
                field: "slot count",
                value: item_count as i64,
            })?;
            let item_id = buf.read_varint()?;
            let add_count = buf.read_varint()?;
            let remove_count = buf.read_varint()?;
            if add_count != 0 {
                return Err(DecodeError::UnsupportedComponents(add_count));
            }
            if remove_count < 0 {
                return Err(DecodeError::NegativeLength(remove_count));
            }
            for _ in 0..remove_count {
                buf.read_varint()?;
            }
            if remove_count > 0 {
                tracing::debug!("Slot has {} removed components, ignored", remove_count);
            }
            Ok(Some(ItemStack::new(item_id, count)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_fixed_width_big_endian() {
        let data = [0x12, 0x34, 0xFF, 0xFF, 0xFF, 0xFE, 0x3F, 0x80, 0x00, 0x00];
        let mut buf = DataBuffer::new(&data);
        assert_eq!(buf.read_u16().unwrap(), 0x1234);
        assert_eq!(buf.read_i32().unwrap(), -2);
        assert_eq!(buf.read_f32().unwrap(), 1.0);
        assert_eq!(buf.remaining(), 0);
        assert_eq!(buf.offset(), 10);
    }

    #[test]
    fn test_varint_known_values() {
        let test_cases = vec![
            (0, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7F]),
            (128, vec![0x80, 0x01]),
            (255, vec![0xFF, 0x01]),
            (25565, vec![0xDD, 0xC7, 0x01]),
            (2097151, vec![0xFF, 0xFF, 0x7F]),
            (2147483647, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x07]),
            (-1, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
            (-2147483648, vec![0x80, 0x80, 0x80, 0x80, 0x08]),
        ];

        for (value, bytes) in test_cases {
            let mut buf = DataBuffer::new(&bytes);
            assert_eq!(buf.read_varint().unwrap(), value, "read_varint for {}", value);
            assert_eq!(buf.offset(), bytes.len());
        }
    }

    #[test]
    fn test_varint_too_big() {
        let data = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut buf = DataBuffer::new(&data);
        assert_eq!(buf.read_varint(), Err(DecodeError::VarIntTooBig));
        assert_eq!(buf.offset(), 0);
    }

    #[test]
    fn test_truncated_varint_is_out_of_bounds() {
        let data = [0xFF, 0xFF];
        let mut buf = DataBuffer::new(&data);
        assert!(matches!(
            buf.read_varint(),
            Err(DecodeError::OutOfBounds { .. })
        ));
        assert_eq!(buf.offset(), 0);
    }

    #[test]
    fn test_varlong() {
        let mut out = BytesMut::new();
        write_varlong(&mut out, i64::MIN);
        write_varlong(&mut out, 9_223_372_036_854_775_807);
        let mut buf = DataBuffer::new(&out);
        assert_eq!(buf.read_varlong().unwrap(), i64::MIN);
        assert_eq!(buf.read_varlong().unwrap(), i64::MAX);
    }

    #[test]
    fn test_read_past_end_leaves_offset() {
        let data = [1, 2, 3];
        let mut buf = DataBuffer::new(&data);
        buf.read_u8().unwrap();
        assert_eq!(
            buf.read_u32(),
            Err(DecodeError::OutOfBounds {
                requested: 4,
                remaining: 2
            })
        );
        assert_eq!(buf.offset(), 1);
        assert!(buf.read_bytes(3).is_err());
        assert_eq!(buf.read_bytes(2).unwrap(), &[2, 3]);
    }

    #[test]
    fn test_string_roundtrip() {
        let mut out = BytesMut::new();
        write_string(&mut out, "Hello, Minecraft!");
        let mut buf = DataBuffer::new(&out);
        assert_eq!(buf.read_string(32767).unwrap(), "Hello, Minecraft!");
    }

    #[test]
    fn test_string_limits() {
        let mut out = BytesMut::new();
        write_string(&mut out, "seventeen_letters");
        let mut buf = DataBuffer::new(&out);
        assert!(matches!(
            buf.read_string(16),
            Err(DecodeError::StringTooLong { .. })
        ));
        assert_eq!(buf.offset(), 0);

        let limits = DecodeLimits {
            max_string_bytes: 8,
            ..DecodeLimits::default()
        };
        let mut buf = DataBuffer::with_limits(&out, limits);
        assert_eq!(
            buf.read_string(32767),
            Err(DecodeError::StringTooLong { len: 17, max: 8 })
        );
    }

    #[test]
    fn test_string_declared_longer_than_data() {
        let data = [0x05, b'a', b'b'];
        let mut buf = DataBuffer::new(&data);
        assert!(matches!(
            buf.read_string(255),
            Err(DecodeError::OutOfBounds { .. })
        ));
        assert_eq!(buf.offset(), 0);
    }

    #[test]
    fn test_invalid_utf8() {
        let data = [0x02, 0xC3, 0x28];
        let mut buf = DataBuffer::new(&data);
        assert_eq!(buf.read_string(255), Err(DecodeError::InvalidUtf8));
        assert_eq!(buf.offset(), 0);
    }

    #[test]
    fn test_negative_length() {
        let mut out = BytesMut::new();
        write_varint(&mut out, -3);
        let mut buf = DataBuffer::new(&out);
        assert_eq!(buf.read_byte_array(16), Err(DecodeError::NegativeLength(-3)));
        assert_eq!(buf.offset(), 0);
    }

    #[test]
    fn test_array_limit() {
        let mut out = BytesMut::new();
        write_varint(&mut out, 10);
        let limits = DecodeLimits {
            max_array_len: 4,
            ..DecodeLimits::default()
        };
        let mut buf = DataBuffer::with_limits(&out, limits);
        assert_eq!(
            buf.read_array(|b| b.read_u8()),
            Err(DecodeError::ArrayTooLong { len: 10, max: 4 })
        );
    }

    #[test]
    fn test_array_failure_rewinds() {
        let mut out = BytesMut::new();
        write_varint(&mut out, 3);
        out.put_u8(1);
        out.put_u8(2);
        let mut buf = DataBuffer::new(&out);
        assert!(buf.read_array(|b| b.read_u8()).is_err());
        assert_eq!(buf.offset(), 0);
    }

    #[test]
    fn test_uuid_and_position() {
        let uuid = Uuid::new_v4();
        let pos = BlockPos::new(-100, 70, 3000);
        let mut out = BytesMut::new();
        write_uuid(&mut out, &uuid);
        write_position(&mut out, &pos);
        let mut buf = DataBuffer::new(&out);
        assert_eq!(buf.read_uuid().unwrap(), uuid);
        assert_eq!(buf.read_position().unwrap(), pos);
    }

    #[test]
    fn test_sub_buffer_is_bounded() {
        let data = [1, 2, 3, 4, 5];
        let mut buf = DataBuffer::new(&data);
        let mut sub = buf.sub_buffer(2).unwrap();
        assert_eq!(buf.offset(), 2);
        assert_eq!(sub.read_u16().unwrap(), 0x0102);
        assert!(sub.read_u8().is_err());
        assert!(buf.sub_buffer(4).is_err());
        assert_eq!(buf.offset(), 2);
    }

    #[test]
    fn test_nbt_offsets() {
        let nbt = trowel_nbt::nbt_compound! { "a" => NbtValue::Int(1) };
        let mut out = BytesMut::new();
        nbt.write_root_network(&mut out);
        out.put_u8(0); // TAG_End: absent
        out.put_u8(0x2A);
        let mut buf = DataBuffer::new(&out);
        assert_eq!(buf.read_nbt().unwrap(), nbt);
        assert_eq!(buf.read_nbt(), Err(DecodeError::Nbt(NbtError::UnexpectedEnd)));
        assert_eq!(buf.read_optional_nbt().unwrap(), None);
        assert_eq!(buf.read_u8().unwrap(), 0x2A);
    }

    #[test]
    fn test_truncated_nbt_is_out_of_bounds() {
        let nbt = trowel_nbt::nbt_compound! { "name" => NbtValue::String("Sorter".into()) };
        let mut out = BytesMut::new();
        nbt.write_root_network(&mut out);
        let cut = &out[..out.len() - 3];
        let mut buf = DataBuffer::new(cut);
        assert!(matches!(
            buf.read_optional_nbt(),
            Err(DecodeError::OutOfBounds { .. })
        ));
        assert_eq!(buf.offset(), 0);
    }

    #[test]
    fn test_slot() {
        let mut out = BytesMut::new();
        write_slot(&mut out, &Some(ItemStack::new(1, 64)));
        write_slot(&mut out, &None);
        // one item with a removed component
        write_varint(&mut out, 1);
        write_varint(&mut out, 812);
        write_varint(&mut out, 0);
        write_varint(&mut out, 1);
        write_varint(&mut out, 9);
        let mut buf = DataBuffer::new(&out);
        assert_eq!(buf.read_slot().unwrap(), Some(ItemStack::new(1, 64)));
        assert_eq!(buf.read_slot().unwrap(), None);
        assert_eq!(buf.read_slot().unwrap(), Some(ItemStack::new(812, 1)));
        assert!(!buf.has_remaining());
    }

    #[test]
    fn test_slot_with_added_components_fails() {
        let mut out = BytesMut::new();
        for v in [1, 812, 2, 0] {
            write_varint(&mut out, v);
        }
        let mut buf = DataBuffer::new(&out);
        assert_eq!(buf.read_slot(), Err(DecodeError::UnsupportedComponents(2)));
        assert_eq!(buf.offset(), 0);
    }
}
