use crate::codec::*;
use crate::packets::common::{read_hand, read_vec3d, write_vec3d};
use crate::{DataBuffer, DecodeError, DecodeResult, PacketBody};
use bytes::{BufMut, BytesMut};
use trowel_types::{BlockPos, Hand, ItemStack, Vec3d};

const MAX_CHAT_LEN: usize = 256;
const SIGNATURE_LEN: usize = 256;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfirmTeleportation {
    pub teleport_id: i32,
}

impl PacketBody for ConfirmTeleportation {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.teleport_id = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.teleport_id);
    }
}

/// Unsigned command, without the leading slash.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatCommand {
    pub command: String,
}

impl PacketBody for ChatCommand {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.command = buf.read_string(MAX_CHAT_LEN)?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.command);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    pub message: String,
    pub timestamp: i64,
    pub salt: i64,
    pub signature: Option<Vec<u8>>,
    pub message_count: i32,
    /// Fixed 20-bit set of acknowledged messages.
    pub acknowledged: [u8; 3],
}

impl PacketBody for ChatMessage {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.message = buf.read_string(MAX_CHAT_LEN)?;
        self.timestamp = buf.read_i64()?;
        self.salt = buf.read_i64()?;
        self.signature = buf.read_option(|buf| Ok(buf.read_bytes(SIGNATURE_LEN)?.to_vec()))?;
        self.message_count = buf.read_varint()?;
        self.acknowledged = buf.read_fixed()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.message);
        buf.put_i64(self.timestamp);
        buf.put_i64(self.salt);
        match &self.signature {
            Some(sig) => {
                write_bool(buf, true);
                buf.put_slice(sig);
            }
            None => write_bool(buf, false),
        }
        write_varint(buf, self.message_count);
        buf.put_slice(&self.acknowledged);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChunkBatchReceived {
    pub chunks_per_tick: f32,
}

impl PacketBody for ChunkBatchReceived {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.chunks_per_tick = buf.read_f32()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_f32(self.chunks_per_tick);
    }
}

/// 0 = perform respawn, 1 = request stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStatus {
    pub action_id: i32,
}

impl PacketBody for ClientStatus {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.action_id = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.action_id);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseContainer {
    pub window_id: u8,
}

impl PacketBody for CloseContainer {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.window_id = buf.read_u8()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.window_id);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetPlayerPosition {
    pub position: Vec3d,
    pub on_ground: bool,
}

impl PacketBody for SetPlayerPosition {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.position = read_vec3d(buf)?;
        self.on_ground = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_vec3d(buf, &self.position);
        write_bool(buf, self.on_ground);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetPlayerPositionAndRotation {
    pub position: Vec3d,
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl PacketBody for SetPlayerPositionAndRotation {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.position = read_vec3d(buf)?;
        self.yaw = buf.read_f32()?;
        self.pitch = buf.read_f32()?;
        self.on_ground = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_vec3d(buf, &self.position);
        buf.put_f32(self.yaw);
        buf.put_f32(self.pitch);
        write_bool(buf, self.on_ground);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetPlayerRotation {
    pub yaw: f32,
    pub pitch: f32,
    pub on_ground: bool,
}

impl PacketBody for SetPlayerRotation {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.yaw = buf.read_f32()?;
        self.pitch = buf.read_f32()?;
        self.on_ground = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_f32(self.yaw);
        buf.put_f32(self.pitch);
        write_bool(buf, self.on_ground);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetPlayerOnGround {
    pub on_ground: bool,
}

impl PacketBody for SetPlayerOnGround {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.on_ground = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_bool(buf, self.on_ground);
    }
}

/// Block digging and item drop/swap actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerAction {
    pub status: i32,
    pub position: BlockPos,
    pub face: u8,
    pub sequence: i32,
}

impl PacketBody for PlayerAction {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.status = buf.read_varint()?;
        self.position = buf.read_position()?;
        self.face = buf.read_u8()?;
        self.sequence = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.status);
        write_position(buf, &self.position);
        buf.put_u8(self.face);
        write_varint(buf, self.sequence);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetHeldItemServerbound {
    pub slot: i16,
}

impl PacketBody for SetHeldItemServerbound {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        let slot = buf.read_i16()?;
        if !(0..9).contains(&slot) {
            return Err(DecodeError::InvalidValue {
                field: "hotbar slot",
                value: slot as i64,
            });
        }
        self.slot = slot;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i16(self.slot);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetCreativeModeSlot {
    pub slot: i16,
    pub item: Option<ItemStack>,
}

impl PacketBody for SetCreativeModeSlot {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.slot = buf.read_i16()?;
        self.item = buf.read_slot()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i16(self.slot);
        write_slot(buf, &self.item);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwingArm {
    pub hand: Hand,
}

impl PacketBody for SwingArm {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.hand = read_hand(buf)?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.hand as i32);
    }
}

/// Right-click on a block face.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UseItemOn {
    pub hand: Hand,
    pub position: BlockPos,
    pub face: i32,
    pub cursor_x: f32,
    pub cursor_y: f32,
    pub cursor_z: f32,
    pub inside_block: bool,
    pub sequence: i32,
}

impl PacketBody for UseItemOn {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.hand = read_hand(buf)?;
        self.position = buf.read_position()?;
        self.face = buf.read_varint()?;
        self.cursor_x = buf.read_f32()?;
        self.cursor_y = buf.read_f32()?;
        self.cursor_z = buf.read_f32()?;
        self.inside_block = buf.read_bool()?;
        self.sequence = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.hand as i32);
        write_position(buf, &self.position);
        write_varint(buf, self.face);
        buf.put_f32(self.cursor_x);
        buf.put_f32(self.cursor_y);
        buf.put_f32(self.cursor_z);
        write_bool(buf, self.inside_block);
        write_varint(buf, self.sequence);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UseItem {
    pub hand: Hand,
    pub sequence: i32,
    pub yaw: f32,
    pub pitch: f32,
}

impl PacketBody for UseItem {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.hand = read_hand(buf)?;
        self.sequence = buf.read_varint()?;
        self.yaw = buf.read_f32()?;
        self.pitch = buf.read_f32()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.hand as i32);
        write_varint(buf, self.sequence);
        buf.put_f32(self.yaw);
        buf.put_f32(self.pitch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reencode<T: PacketBody + PartialEq>(original: &T) -> T {
        let mut out = BytesMut::new();
        original.encode(&mut out);
        let mut buf = DataBuffer::new(&out);
        let mut decoded = T::default();
        decoded.decode(&mut buf).unwrap();
        assert!(!buf.has_remaining());
        decoded
    }

    #[test]
    fn test_chat_message_signed_and_unsigned() {
        let mut msg = ChatMessage {
            message: "hello".into(),
            timestamp: 1_700_000_000_000,
            salt: -42,
            signature: Some(vec![0xAB; SIGNATURE_LEN]),
            message_count: 3,
            acknowledged: [0x01, 0x00, 0x08],
        };
        assert_eq!(reencode(&msg), msg);
        msg.signature = None;
        assert_eq!(reencode(&msg), msg);
    }

    #[test]
    fn test_use_item_on_off_hand() {
        let packet = UseItemOn {
            hand: Hand::Off,
            position: BlockPos::new(10, -60, -3),
            face: 1,
            cursor_x: 0.5,
            cursor_y: 1.0,
            cursor_z: 0.25,
            inside_block: false,
            sequence: 17,
        };
        assert_eq!(reencode(&packet), packet);
    }

    #[test]
    fn test_held_item_out_of_range() {
        let data = 9i16.to_be_bytes();
        let mut packet = SetHeldItemServerbound::default();
        assert_eq!(
            packet.decode(&mut DataBuffer::new(&data)),
            Err(DecodeError::InvalidValue {
                field: "hotbar slot",
                value: 9
            })
        );
    }

    #[test]
    fn test_creative_slot_empty() {
        let packet = SetCreativeModeSlot {
            slot: 36,
            item: None,
        };
        assert_eq!(reencode(&packet), packet);
        let packet = SetCreativeModeSlot {
            slot: 36,
            item: Some(ItemStack::new(1, 64)),
        };
        assert_eq!(reencode(&packet), packet);
    }
}
