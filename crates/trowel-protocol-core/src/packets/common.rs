use crate::codec::*;
use crate::{DataBuffer, DecodeError, DecodeResult, PacketBody, DEFAULT_STRING_LEN};
use bytes::{BufMut, BytesMut};
use trowel_nbt::NbtValue;
use trowel_types::{Hand, Identifier, Vec3d};

/// Body of every packet that carries no fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyPacket;

impl PacketBody for EmptyPacket {
    fn decode(&mut self, _buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        Ok(())
    }

    fn encode(&self, _buf: &mut BytesMut) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeepAlive {
    pub id: i64,
}

impl PacketBody for KeepAlive {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.id = buf.read_i64()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i64(self.id);
    }
}

/// Configuration/play ping and pong: an opaque i32 echoed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingId {
    pub id: i32,
}

impl PacketBody for PingId {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.id = buf.read_i32()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.id);
    }
}

/// A plugin channel message. The payload runs to the end of the packet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginMessage {
    pub channel: Identifier,
    pub data: Vec<u8>,
}

impl PacketBody for PluginMessage {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.channel = buf.read_identifier()?;
        self.data = read_trailing_bytes(buf)?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_identifier(buf, &self.channel);
        buf.put_slice(&self.data);
    }
}

/// Client settings, sent in configuration and again in play when changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInformation {
    pub locale: String,
    pub view_distance: i8,
    pub chat_mode: i32,
    pub chat_colors: bool,
    pub skin_parts: u8,
    pub main_hand: Hand,
    pub text_filtering: bool,
    pub allow_listing: bool,
}

impl PacketBody for ClientInformation {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.locale = buf.read_string(16)?;
        self.view_distance = buf.read_i8()?;
        self.chat_mode = buf.read_varint()?;
        self.chat_colors = buf.read_bool()?;
        self.skin_parts = buf.read_u8()?;
        self.main_hand = read_hand(buf)?;
        self.text_filtering = buf.read_bool()?;
        self.allow_listing = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.locale);
        buf.put_i8(self.view_distance);
        write_varint(buf, self.chat_mode);
        write_bool(buf, self.chat_colors);
        buf.put_u8(self.skin_parts);
        write_varint(buf, self.main_hand as i32);
        write_bool(buf, self.text_filtering);
        write_bool(buf, self.allow_listing);
    }
}

/// Disconnect carrying an NBT text component (configuration and play).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NbtDisconnect {
    pub reason: NbtValue,
}

impl NbtDisconnect {
    pub fn text(&self) -> String {
        nbt_text(&self.reason)
    }
}

impl PacketBody for NbtDisconnect {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.reason = buf.read_nbt()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_nbt(buf, &self.reason);
    }
}

/// Plain text of an NBT text component: either a bare string tag or a
/// compound with `text` and `extra`.
pub fn nbt_text(nbt: &NbtValue) -> String {
    if let Some(s) = nbt.as_str() {
        return s.to_string();
    }
    let mut out = nbt
        .get("text")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if let Some(extra) = nbt.get("extra").and_then(|v| v.as_list()) {
        for child in extra {
            out.push_str(&nbt_text(child));
        }
    }
    out
}

pub(crate) fn read_hand(buf: &mut DataBuffer<'_>) -> DecodeResult<Hand> {
    buf.transaction(|buf| {
        let id = buf.read_varint()?;
        Hand::from_id(id).ok_or(DecodeError::InvalidValue {
            field: "hand",
            value: id as i64,
        })
    })
}

pub(crate) fn read_vec3d(buf: &mut DataBuffer<'_>) -> DecodeResult<Vec3d> {
    buf.transaction(|buf| Ok(Vec3d::new(buf.read_f64()?, buf.read_f64()?, buf.read_f64()?)))
}

pub(crate) fn write_vec3d(buf: &mut BytesMut, v: &Vec3d) {
    buf.put_f64(v.x);
    buf.put_f64(v.y);
    buf.put_f64(v.z);
}

/// Everything left in the packet, capped by the byte-array limit.
pub(crate) fn read_trailing_bytes(buf: &mut DataBuffer<'_>) -> DecodeResult<Vec<u8>> {
    let max = buf.limits().max_byte_array;
    if buf.remaining() > max {
        return Err(DecodeError::ByteArrayTooLong {
            len: buf.remaining(),
            max,
        });
    }
    Ok(buf.read_remaining().to_vec())
}

pub(crate) fn read_json_string(buf: &mut DataBuffer<'_>) -> DecodeResult<String> {
    buf.read_string(262144)
}

pub(crate) fn read_short_string(buf: &mut DataBuffer<'_>) -> DecodeResult<String> {
    buf.read_string(DEFAULT_STRING_LEN)
}
