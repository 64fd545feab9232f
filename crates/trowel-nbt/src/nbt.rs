use bytes::{Buf, BufMut};
use thiserror::Error;

/// NBT tag type IDs.
pub const TAG_END: u8 = 0;
pub const TAG_BYTE: u8 = 1;
pub const TAG_SHORT: u8 = 2;
pub const TAG_INT: u8 = 3;
pub const TAG_LONG: u8 = 4;
pub const TAG_FLOAT: u8 = 5;
pub const TAG_DOUBLE: u8 = 6;
pub const TAG_BYTE_ARRAY: u8 = 7;
pub const TAG_STRING: u8 = 8;
pub const TAG_LIST: u8 = 9;
pub const TAG_COMPOUND: u8 = 10;
pub const TAG_INT_ARRAY: u8 = 11;
pub const TAG_LONG_ARRAY: u8 = 12;

/// Nesting limit for compounds and lists, same as the vanilla client.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NbtError {
    #[error("Not enough data: needed {needed} bytes, {remaining} remaining")]
    NotEnoughData { needed: usize, remaining: usize },
    #[error("Unknown tag type {0}")]
    UnknownTag(u8),
    #[error("Unexpected TAG_End")]
    UnexpectedEnd,
    #[error("Negative length {0}")]
    NegativeLength(i32),
    #[error("Nesting deeper than {MAX_DEPTH}")]
    TooDeep,
}

pub type NbtResult<T> = Result<T, NbtError>;

/// An NBT value.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<NbtValue>),
    Compound(Vec<(String, NbtValue)>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

/// An empty compound, the usual "nothing here" value.
impl Default for NbtValue {
    fn default() -> Self {
        NbtValue::Compound(Vec::new())
    }
}

impl NbtValue {
    pub fn tag_id(&self) -> u8 {
        match self {
            NbtValue::Byte(_) => TAG_BYTE,
            NbtValue::Short(_) => TAG_SHORT,
            NbtValue::Int(_) => TAG_INT,
            NbtValue::Long(_) => TAG_LONG,
            NbtValue::Float(_) => TAG_FLOAT,
            NbtValue::Double(_) => TAG_DOUBLE,
            NbtValue::ByteArray(_) => TAG_BYTE_ARRAY,
            NbtValue::String(_) => TAG_STRING,
            NbtValue::List(_) => TAG_LIST,
            NbtValue::Compound(_) => TAG_COMPOUND,
            NbtValue::IntArray(_) => TAG_INT_ARRAY,
            NbtValue::LongArray(_) => TAG_LONG_ARRAY,
        }
    }

    /// Look up a key in a compound. `None` for missing keys and non-compounds.
    pub fn get(&self, key: &str) -> Option<&NbtValue> {
        match self {
            NbtValue::Compound(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_byte(&self) -> Option<i8> {
        match self {
            NbtValue::Byte(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        match self {
            NbtValue::Short(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            NbtValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            NbtValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integral tag widened to i64.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            NbtValue::Byte(v) => Some(*v as i64),
            NbtValue::Short(v) => Some(*v as i64),
            NbtValue::Int(v) => Some(*v as i64),
            NbtValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NbtValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[NbtValue]> {
        match self {
            NbtValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&[(String, NbtValue)]> {
        match self {
            NbtValue::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        match self {
            NbtValue::LongArray(v) => Some(v),
            _ => None,
        }
    }

    /// Write this value as a root compound tag (with empty name) for network protocol.
    pub fn write_root_network(&self, buf: &mut impl BufMut) {
        // Network NBT in 1.20.2+: root compound tag with type byte, but NO name
        buf.put_u8(self.tag_id());
        self.write_payload(buf);
    }

    /// Write this value as a full named root tag (for files).
    pub fn write_root_named(&self, name: &str, buf: &mut impl BufMut) {
        buf.put_u8(self.tag_id());
        write_nbt_string(name, buf);
        self.write_payload(buf);
    }

    /// Write just the payload (no tag type or name).
    pub fn write_payload(&self, buf: &mut impl BufMut) {
        match self {
            NbtValue::Byte(v) => buf.put_i8(*v),
            NbtValue::Short(v) => buf.put_i16(*v),
            NbtValue::Int(v) => buf.put_i32(*v),
            NbtValue::Long(v) => buf.put_i64(*v),
            NbtValue::Float(v) => buf.put_f32(*v),
            NbtValue::Double(v) => buf.put_f64(*v),
            NbtValue::ByteArray(v) => {
                buf.put_i32(v.len() as i32);
                for b in v {
                    buf.put_i8(*b);
                }
            }
            NbtValue::String(v) => write_nbt_string(v, buf),
            NbtValue::List(v) => {
                if v.is_empty() {
                    buf.put_u8(TAG_END);
                    buf.put_i32(0);
                } else {
                    buf.put_u8(v[0].tag_id());
                    buf.put_i32(v.len() as i32);
                    for item in v {
                        item.write_payload(buf);
                    }
                }
            }
            NbtValue::Compound(entries) => {
                for (name, value) in entries {
                    buf.put_u8(value.tag_id());
                    write_nbt_string(name, buf);
                    value.write_payload(buf);
                }
                buf.put_u8(TAG_END);
            }
            NbtValue::IntArray(v) => {
                buf.put_i32(v.len() as i32);
                for i in v {
                    buf.put_i32(*i);
                }
            }
            NbtValue::LongArray(v) => {
                buf.put_i32(v.len() as i32);
                for l in v {
                    buf.put_i64(*l);
                }
            }
        }
    }

    /// Read a nameless network root tag. A bare TAG_End yields `None`, which is
    /// how the protocol encodes "no data" in optional NBT fields.
    pub fn read_root_network(buf: &mut impl Buf) -> NbtResult<Option<NbtValue>> {
        let tag = read_u8(buf)?;
        if tag == TAG_END {
            return Ok(None);
        }
        read_payload(tag, buf, 0).map(Some)
    }

    /// Read a named root tag (file format). Returns the root name and value.
    pub fn read_root_named(buf: &mut impl Buf) -> NbtResult<(String, NbtValue)> {
        let tag = read_u8(buf)?;
        if tag == TAG_END {
            return Err(NbtError::UnexpectedEnd);
        }
        let name = read_nbt_string(buf)?;
        let value = read_payload(tag, buf, 0)?;
        Ok((name, value))
    }
}

fn write_nbt_string(s: &str, buf: &mut impl BufMut) {
    let bytes = s.as_bytes();
    buf.put_u16(bytes.len() as u16);
    buf.put_slice(bytes);
}

fn ensure(buf: &impl Buf, needed: usize) -> NbtResult<()> {
    if buf.remaining() < needed {
        return Err(NbtError::NotEnoughData {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

fn read_u8(buf: &mut impl Buf) -> NbtResult<u8> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

fn read_len(buf: &mut impl Buf, elem_size: usize) -> NbtResult<usize> {
    ensure(buf, 4)?;
    let len = buf.get_i32();
    if len < 0 {
        return Err(NbtError::NegativeLength(len));
    }
    // Reject lengths the buffer cannot possibly satisfy before allocating.
    ensure(buf, len as usize * elem_size)?;
    Ok(len as usize)
}

fn read_nbt_string(buf: &mut impl Buf) -> NbtResult<String> {
    ensure(buf, 2)?;
    let len = buf.get_u16() as usize;
    ensure(buf, len)?;
    let bytes = buf.copy_to_bytes(len);
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn read_payload(tag: u8, buf: &mut impl Buf, depth: usize) -> NbtResult<NbtValue> {
    if depth > MAX_DEPTH {
        return Err(NbtError::TooDeep);
    }
    let value = match tag {
        TAG_BYTE => {
            ensure(buf, 1)?;
            NbtValue::Byte(buf.get_i8())
        }
        TAG_SHORT => {
            ensure(buf, 2)?;
            NbtValue::Short(buf.get_i16())
        }
        TAG_INT => {
            ensure(buf, 4)?;
            NbtValue::Int(buf.get_i32())
        }
        TAG_LONG => {
            ensure(buf, 8)?;
            NbtValue::Long(buf.get_i64())
        }
        TAG_FLOAT => {
            ensure(buf, 4)?;
            NbtValue::Float(buf.get_f32())
        }
        TAG_DOUBLE => {
            ensure(buf, 8)?;
            NbtValue::Double(buf.get_f64())
        }
        TAG_BYTE_ARRAY => {
            let len = read_len(buf, 1)?;
            NbtValue::ByteArray((0..len).map(|_| buf.get_i8()).collect())
        }
        TAG_STRING => NbtValue::String(read_nbt_string(buf)?),
        TAG_LIST => {
            let elem_tag = read_u8(buf)?;
            let len = read_len(buf, 0)?;
            if elem_tag == TAG_END && len > 0 {
                return Err(NbtError::UnexpectedEnd);
            }
            let mut items = Vec::with_capacity(len.min(buf.remaining()));
            for _ in 0..len {
                items.push(read_payload(elem_tag, buf, depth + 1)?);
            }
            NbtValue::List(items)
        }
        TAG_COMPOUND => {
            let mut entries = Vec::new();
            loop {
                let child = read_u8(buf)?;
                if child == TAG_END {
                    break;
                }
                let name = read_nbt_string(buf)?;
                let value = read_payload(child, buf, depth + 1)?;
                entries.push((name, value));
            }
            NbtValue::Compound(entries)
        }
        TAG_INT_ARRAY => {
            let len = read_len(buf, 4)?;
            NbtValue::IntArray((0..len).map(|_| buf.get_i32()).collect())
        }
        TAG_LONG_ARRAY => {
            let len = read_len(buf, 8)?;
            NbtValue::LongArray((0..len).map(|_| buf.get_i64()).collect())
        }
        TAG_END => return Err(NbtError::UnexpectedEnd),
        other => return Err(NbtError::UnknownTag(other)),
    };
    Ok(value)
}

/// Helper macro for building compound tags.
#[macro_export]
macro_rules! nbt_compound {
    ($($key:expr => $val:expr),* $(,)?) => {
        $crate::NbtValue::Compound(vec![
            $(($key.into(), $val)),*
        ])
    };
}

/// Helper macro for building list tags.
#[macro_export]
macro_rules! nbt_list {
    ($($val:expr),* $(,)?) => {
        $crate::NbtValue::List(vec![$($val),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn sample() -> NbtValue {
        nbt_compound! {
            "id" => NbtValue::String("minecraft:dropper".into()),
            "x" => NbtValue::Int(-12),
            "Items" => nbt_list![
                nbt_compound! {
                    "Slot" => NbtValue::Byte(4),
                    "id" => NbtValue::String("minecraft:stone".into()),
                    "count" => NbtValue::Int(64)
                }
            ],
            "heights" => NbtValue::LongArray(vec![1, -2, 3]),
            "empty" => NbtValue::List(vec![]),
        }
    }

    #[test]
    fn test_write_simple_compound() {
        let nbt = NbtValue::Compound(vec![
            ("name".into(), NbtValue::String("test".into())),
            ("value".into(), NbtValue::Int(42)),
        ]);
        let mut buf = BytesMut::new();
        nbt.write_root_network(&mut buf);
        // Should start with TAG_COMPOUND (10)
        assert_eq!(buf[0], TAG_COMPOUND);
    }

    #[test]
    fn test_long_array() {
        let nbt = NbtValue::LongArray(vec![1, 2, 3]);
        let mut buf = BytesMut::new();
        nbt.write_payload(&mut buf);
        // 4 bytes length (3) + 3 * 8 bytes = 28 bytes
        assert_eq!(buf.len(), 28);
    }

    #[test]
    fn test_read_network_matches_written() {
        let nbt = sample();
        let mut buf = BytesMut::new();
        nbt.write_root_network(&mut buf);
        let mut slice = &buf[..];
        let read = NbtValue::read_root_network(&mut slice).unwrap();
        assert_eq!(read, Some(nbt));
        assert!(slice.is_empty());
    }

    #[test]
    fn test_read_named_root() {
        let nbt = sample();
        let mut buf = BytesMut::new();
        nbt.write_root_named("level", &mut buf);
        let (name, read) = NbtValue::read_root_named(&mut &buf[..]).unwrap();
        assert_eq!(name, "level");
        assert_eq!(read.get("x").and_then(|v| v.as_int()), Some(-12));
    }

    #[test]
    fn test_end_tag_is_absent() {
        let mut slice: &[u8] = &[TAG_END];
        assert_eq!(NbtValue::read_root_network(&mut slice).unwrap(), None);
    }

    #[test]
    fn test_truncated_input() {
        let mut buf = BytesMut::new();
        sample().write_root_network(&mut buf);
        let truncated = &buf[..buf.len() - 3];
        let err = NbtValue::read_root_network(&mut &truncated[..]).unwrap_err();
        assert!(matches!(err, NbtError::NotEnoughData { .. }));
    }

    #[test]
    fn test_huge_array_length_rejected_without_allocating() {
        // TAG_Long_Array with length i32::MAX and no payload
        let mut slice: &[u8] = &[TAG_LONG_ARRAY, 0x7F, 0xFF, 0xFF, 0xFF];
        let err = NbtValue::read_root_network(&mut slice).unwrap_err();
        assert!(matches!(err, NbtError::NotEnoughData { .. }));
    }

    #[test]
    fn test_accessors() {
        let nbt = sample();
        let items = nbt.get("Items").and_then(|v| v.as_list()).unwrap();
        assert_eq!(items[0].get("Slot").and_then(|v| v.as_byte()), Some(4));
        assert_eq!(items[0].get("count").and_then(|v| v.as_integer()), Some(64));
        assert_eq!(nbt.get("missing"), None);
        assert_eq!(NbtValue::Int(1).get("x"), None);
    }
}
