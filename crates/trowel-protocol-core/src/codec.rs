//! Write-side helpers. Reads live on [`crate::DataBuffer`].

use bytes::{BufMut, BytesMut};
use trowel_nbt::NbtValue;
use trowel_types::{BlockPos, Identifier, ItemStack};
use uuid::Uuid;

/// Write a VarInt to the buffer.
pub fn write_varint(buf: &mut BytesMut, mut value: i32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value = ((value as u32) >> 7) as i32;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Write a VarLong to the buffer.
pub fn write_varlong(buf: &mut BytesMut, mut value: i64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value = ((value as u64) >> 7) as i64;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

pub fn write_bool(buf: &mut BytesMut, value: bool) {
    buf.put_u8(value as u8);
}

/// Write a protocol string.
pub fn write_string(buf: &mut BytesMut, s: &str) {
    write_varint(buf, s.len() as i32);
    buf.put_slice(s.as_bytes());
}

pub fn write_identifier(buf: &mut BytesMut, id: &Identifier) {
    write_string(buf, &id.to_string());
}

/// Write a UUID.
pub fn write_uuid(buf: &mut BytesMut, uuid: &Uuid) {
    buf.put_slice(uuid.as_bytes());
}

/// Write a byte array with varint length prefix.
pub fn write_byte_array(buf: &mut BytesMut, data: &[u8]) {
    write_varint(buf, data.len() as i32);
    buf.put_slice(data);
}

pub fn write_position(buf: &mut BytesMut, pos: &BlockPos) {
    buf.put_u64(pos.encode());
}

pub fn write_bitset(buf: &mut BytesMut, longs: &[i64]) {
    write_varint(buf, longs.len() as i32);
    for v in longs {
        buf.put_i64(*v);
    }
}

pub fn write_nbt(buf: &mut BytesMut, nbt: &NbtValue) {
    nbt.write_root_network(buf);
}

/// `None` is written as a bare TAG_End.
pub fn write_optional_nbt(buf: &mut BytesMut, nbt: &Option<NbtValue>) {
    match nbt {
        Some(nbt) => nbt.write_root_network(buf),
        None => buf.put_u8(trowel_nbt::TAG_END),
    }
}

/// Write a Slot to the wire (1.21.1 component-based format).
pub fn write_slot(buf: &mut BytesMut, slot: &Option<ItemStack>) {
    match slot {
        None => {
            write_varint(buf, 0); // item_count = 0 = empty
        }
        Some(item) => {
            write_varint(buf, item.count as i32);
            write_varint(buf, item.item_id);
            write_varint(buf, 0); // no added components
            write_varint(buf, 0); // no removed components
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_varint_known_values() {
        let test_cases = vec![
            (0, vec![0x00]),
            (128, vec![0x80, 0x01]),
            (25565, vec![0xDD, 0xC7, 0x01]),
            (-1, vec![0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
        ];

        for (value, expected_bytes) in test_cases {
            let mut buf = BytesMut::new();
            write_varint(&mut buf, value);
            assert_eq!(buf.to_vec(), expected_bytes, "write_varint({}) failed", value);
        }
    }

    #[test]
    fn test_varlong_negative_is_ten_bytes() {
        let mut buf = BytesMut::new();
        write_varlong(&mut buf, -1);
        assert_eq!(buf.len(), 10);
        assert_eq!(buf[9], 0x01);
    }
}
