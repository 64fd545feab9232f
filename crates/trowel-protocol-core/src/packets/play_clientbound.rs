use crate::codec::*;
use crate::packets::common::{nbt_text, read_vec3d, write_vec3d};
use crate::packets::login::{read_profile_property, write_profile_property};
use crate::{DataBuffer, DecodeError, DecodeResult, PacketBody};
use bytes::{BufMut, BytesMut};
use trowel_nbt::NbtValue;
use trowel_types::{BlockPos, GameMode, Identifier, ItemStack, ProfileProperty, Vec3d};
use uuid::Uuid;

/// Sky and block light sections are always 2048 bytes.
const LIGHT_ARRAY_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpawnEntity {
    pub entity_id: i32,
    pub entity_uuid: Uuid,
    pub entity_type: i32,
    pub position: Vec3d,
    pub pitch: u8,
    pub yaw: u8,
    pub head_yaw: u8,
    pub data: i32,
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
}

impl PacketBody for SpawnEntity {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_varint()?;
        self.entity_uuid = buf.read_uuid()?;
        self.entity_type = buf.read_varint()?;
        self.position = read_vec3d(buf)?;
        self.pitch = buf.read_angle()?;
        self.yaw = buf.read_angle()?;
        self.head_yaw = buf.read_angle()?;
        self.data = buf.read_varint()?;
        self.velocity_x = buf.read_i16()?;
        self.velocity_y = buf.read_i16()?;
        self.velocity_z = buf.read_i16()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_id);
        write_uuid(buf, &self.entity_uuid);
        write_varint(buf, self.entity_type);
        write_vec3d(buf, &self.position);
        buf.put_u8(self.pitch);
        buf.put_u8(self.yaw);
        buf.put_u8(self.head_yaw);
        write_varint(buf, self.data);
        buf.put_i16(self.velocity_x);
        buf.put_i16(self.velocity_y);
        buf.put_i16(self.velocity_z);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AcknowledgeBlockChange {
    pub sequence: i32,
}

impl PacketBody for AcknowledgeBlockChange {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.sequence = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.sequence);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetBlockDestroyStage {
    pub entity_id: i32,
    pub position: BlockPos,
    /// 0-9, anything else removes the animation.
    pub destroy_stage: i8,
}

impl PacketBody for SetBlockDestroyStage {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_varint()?;
        self.position = buf.read_position()?;
        self.destroy_stage = buf.read_i8()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_id);
        write_position(buf, &self.position);
        buf.put_i8(self.destroy_stage);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockEntityData {
    pub position: BlockPos,
    pub block_entity_type: i32,
    /// `None` (a bare TAG_End) clears the block entity's data.
    pub data: Option<NbtValue>,
}

impl PacketBody for BlockEntityData {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.position = buf.read_position()?;
        self.block_entity_type = buf.read_varint()?;
        self.data = buf.read_optional_nbt()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_position(buf, &self.position);
        write_varint(buf, self.block_entity_type);
        write_optional_nbt(buf, &self.data);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockUpdate {
    pub position: BlockPos,
    pub block_id: i32,
}

impl PacketBody for BlockUpdate {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.position = buf.read_position()?;
        self.block_id = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_position(buf, &self.position);
        write_varint(buf, self.block_id);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkBatchFinished {
    pub batch_size: i32,
}

impl PacketBody for ChunkBatchFinished {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.batch_size = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.batch_size);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetContainerContent {
    pub window_id: u8,
    pub state_id: i32,
    pub slots: Vec<Option<ItemStack>>,
    pub carried_item: Option<ItemStack>,
}

impl PacketBody for SetContainerContent {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.window_id = buf.read_u8()?;
        self.state_id = buf.read_varint()?;
        self.slots = buf.read_array(|buf| buf.read_slot())?;
        self.carried_item = buf.read_slot()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.window_id);
        write_varint(buf, self.state_id);
        write_varint(buf, self.slots.len() as i32);
        for slot in &self.slots {
            write_slot(buf, slot);
        }
        write_slot(buf, &self.carried_item);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetContainerSlot {
    pub window_id: i8,
    pub state_id: i32,
    pub slot: i16,
    pub item: Option<ItemStack>,
}

impl PacketBody for SetContainerSlot {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.window_id = buf.read_i8()?;
        self.state_id = buf.read_varint()?;
        self.slot = buf.read_i16()?;
        self.item = buf.read_slot()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i8(self.window_id);
        write_varint(buf, self.state_id);
        buf.put_i16(self.slot);
        write_slot(buf, &self.item);
    }
}

/// Note the wire order: z before x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnloadChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl PacketBody for UnloadChunk {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.chunk_z = buf.read_i32()?;
        self.chunk_x = buf.read_i32()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.chunk_z);
        buf.put_i32(self.chunk_x);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameEvent {
    pub event: u8,
    pub value: f32,
}

impl PacketBody for GameEvent {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.event = buf.read_u8()?;
        self.value = buf.read_f32()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.event);
        buf.put_f32(self.value);
    }
}

/// A block entity inside a chunk column. `packed_xz` holds the
/// section-relative x in the high nibble and z in the low nibble.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkBlockEntity {
    pub packed_xz: u8,
    pub y: i16,
    pub block_entity_type: i32,
    pub data: Option<NbtValue>,
}

impl ChunkBlockEntity {
    /// Absolute position. Chunk coordinates come off the wire unchecked, so
    /// out-of-world values wrap instead of overflowing.
    pub fn position(&self, chunk_x: i32, chunk_z: i32) -> BlockPos {
        BlockPos::new(
            chunk_x.wrapping_mul(16).wrapping_add((self.packed_xz >> 4) as i32),
            self.y as i32,
            chunk_z.wrapping_mul(16).wrapping_add((self.packed_xz & 0x0F) as i32),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkLightData {
    pub sky_light_mask: Vec<i64>,
    pub block_light_mask: Vec<i64>,
    pub empty_sky_light_mask: Vec<i64>,
    pub empty_block_light_mask: Vec<i64>,
    pub sky_light_arrays: Vec<Vec<u8>>,
    pub block_light_arrays: Vec<Vec<u8>>,
}

impl ChunkLightData {
    fn decode(buf: &mut DataBuffer<'_>) -> DecodeResult<Self> {
        Ok(Self {
            sky_light_mask: buf.read_bitset()?,
            block_light_mask: buf.read_bitset()?,
            empty_sky_light_mask: buf.read_bitset()?,
            empty_block_light_mask: buf.read_bitset()?,
            sky_light_arrays: buf.read_array(|buf| buf.read_byte_array(LIGHT_ARRAY_LEN))?,
            block_light_arrays: buf.read_array(|buf| buf.read_byte_array(LIGHT_ARRAY_LEN))?,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_bitset(buf, &self.sky_light_mask);
        write_bitset(buf, &self.block_light_mask);
        write_bitset(buf, &self.empty_sky_light_mask);
        write_bitset(buf, &self.empty_block_light_mask);
        write_varint(buf, self.sky_light_arrays.len() as i32);
        for arr in &self.sky_light_arrays {
            write_byte_array(buf, arr);
        }
        write_varint(buf, self.block_light_arrays.len() as i32);
        for arr in &self.block_light_arrays {
            write_byte_array(buf, arr);
        }
    }
}

/// A full chunk column. Section data is kept as raw bytes; palettes are
/// not unpacked here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkDataAndUpdateLight {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub heightmaps: NbtValue,
    pub data: Vec<u8>,
    pub block_entities: Vec<ChunkBlockEntity>,
    pub light: ChunkLightData,
}

impl PacketBody for ChunkDataAndUpdateLight {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.chunk_x = buf.read_i32()?;
        self.chunk_z = buf.read_i32()?;
        self.heightmaps = buf.read_nbt()?;
        let max = buf.limits().max_byte_array;
        self.data = buf.read_byte_array(max)?;
        self.block_entities = buf.read_array(|buf| {
            Ok(ChunkBlockEntity {
                packed_xz: buf.read_u8()?,
                y: buf.read_i16()?,
                block_entity_type: buf.read_varint()?,
                data: buf.read_optional_nbt()?,
            })
        })?;
        self.light = ChunkLightData::decode(buf)?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.chunk_x);
        buf.put_i32(self.chunk_z);
        write_nbt(buf, &self.heightmaps);
        write_byte_array(buf, &self.data);
        write_varint(buf, self.block_entities.len() as i32);
        for be in &self.block_entities {
            buf.put_u8(be.packed_xz);
            buf.put_i16(be.y);
            write_varint(buf, be.block_entity_type);
            write_optional_nbt(buf, &be.data);
        }
        self.light.encode(buf);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeathLocation {
    pub dimension: Identifier,
    pub position: BlockPos,
}

/// Login (play): the first packet after configuration finishes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayLogin {
    pub entity_id: i32,
    pub is_hardcore: bool,
    pub dimension_names: Vec<Identifier>,
    pub max_players: i32,
    pub view_distance: i32,
    pub simulation_distance: i32,
    pub reduced_debug_info: bool,
    pub enable_respawn_screen: bool,
    pub do_limited_crafting: bool,
    pub dimension_type: i32,
    pub dimension_name: Identifier,
    pub hashed_seed: i64,
    pub game_mode: GameMode,
    /// -1 when there is no previous game mode.
    pub previous_game_mode: i8,
    pub is_debug: bool,
    pub is_flat: bool,
    pub death_location: Option<DeathLocation>,
    pub portal_cooldown: i32,
    pub enforces_secure_chat: bool,
}

impl PacketBody for PlayLogin {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_i32()?;
        self.is_hardcore = buf.read_bool()?;
        self.dimension_names = buf.read_array(|buf| buf.read_identifier())?;
        self.max_players = buf.read_varint()?;
        self.view_distance = buf.read_varint()?;
        self.simulation_distance = buf.read_varint()?;
        self.reduced_debug_info = buf.read_bool()?;
        self.enable_respawn_screen = buf.read_bool()?;
        self.do_limited_crafting = buf.read_bool()?;
        self.dimension_type = buf.read_varint()?;
        self.dimension_name = buf.read_identifier()?;
        self.hashed_seed = buf.read_i64()?;
        let mode = buf.read_u8()?;
        self.game_mode = GameMode::from_id(mode).ok_or(DecodeError::InvalidValue {
            field: "game mode",
            value: mode as i64,
        })?;
        self.previous_game_mode = buf.read_i8()?;
        self.is_debug = buf.read_bool()?;
        self.is_flat = buf.read_bool()?;
        self.death_location = buf.read_option(|buf| {
            Ok(DeathLocation {
                dimension: buf.read_identifier()?,
                position: buf.read_position()?,
            })
        })?;
        self.portal_cooldown = buf.read_varint()?;
        self.enforces_secure_chat = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.entity_id);
        write_bool(buf, self.is_hardcore);
        write_varint(buf, self.dimension_names.len() as i32);
        for dim in &self.dimension_names {
            write_identifier(buf, dim);
        }
        write_varint(buf, self.max_players);
        write_varint(buf, self.view_distance);
        write_varint(buf, self.simulation_distance);
        write_bool(buf, self.reduced_debug_info);
        write_bool(buf, self.enable_respawn_screen);
        write_bool(buf, self.do_limited_crafting);
        write_varint(buf, self.dimension_type);
        write_identifier(buf, &self.dimension_name);
        buf.put_i64(self.hashed_seed);
        buf.put_u8(self.game_mode.id());
        buf.put_i8(self.previous_game_mode);
        write_bool(buf, self.is_debug);
        write_bool(buf, self.is_flat);
        match &self.death_location {
            Some(loc) => {
                write_bool(buf, true);
                write_identifier(buf, &loc.dimension);
                write_position(buf, &loc.position);
            }
            None => write_bool(buf, false),
        }
        write_varint(buf, self.portal_cooldown);
        write_bool(buf, self.enforces_secure_chat);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateEntityPosition {
    pub entity_id: i32,
    pub delta_x: i16,
    pub delta_y: i16,
    pub delta_z: i16,
    pub on_ground: bool,
}

impl PacketBody for UpdateEntityPosition {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_varint()?;
        self.delta_x = buf.read_i16()?;
        self.delta_y = buf.read_i16()?;
        self.delta_z = buf.read_i16()?;
        self.on_ground = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_id);
        buf.put_i16(self.delta_x);
        buf.put_i16(self.delta_y);
        buf.put_i16(self.delta_z);
        write_bool(buf, self.on_ground);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateEntityPositionAndRotation {
    pub entity_id: i32,
    pub delta_x: i16,
    pub delta_y: i16,
    pub delta_z: i16,
    pub yaw: u8,
    pub pitch: u8,
    pub on_ground: bool,
}

impl PacketBody for UpdateEntityPositionAndRotation {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_varint()?;
        self.delta_x = buf.read_i16()?;
        self.delta_y = buf.read_i16()?;
        self.delta_z = buf.read_i16()?;
        self.yaw = buf.read_angle()?;
        self.pitch = buf.read_angle()?;
        self.on_ground = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_id);
        buf.put_i16(self.delta_x);
        buf.put_i16(self.delta_y);
        buf.put_i16(self.delta_z);
        buf.put_u8(self.yaw);
        buf.put_u8(self.pitch);
        write_bool(buf, self.on_ground);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateEntityRotation {
    pub entity_id: i32,
    pub yaw: u8,
    pub pitch: u8,
    pub on_ground: bool,
}

impl PacketBody for UpdateEntityRotation {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_varint()?;
        self.yaw = buf.read_angle()?;
        self.pitch = buf.read_angle()?;
        self.on_ground = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_id);
        buf.put_u8(self.yaw);
        buf.put_u8(self.pitch);
        write_bool(buf, self.on_ground);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfoRemove {
    pub uuids: Vec<Uuid>,
}

impl PacketBody for PlayerInfoRemove {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.uuids = buf.read_array(|buf| buf.read_uuid())?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.uuids.len() as i32);
        for uuid in &self.uuids {
            write_uuid(buf, uuid);
        }
    }
}

/// Player Info Update action bitmask flags.
pub mod player_info_actions {
    pub const ADD_PLAYER: u8 = 0x01;
    pub const INITIALIZE_CHAT: u8 = 0x02;
    pub const UPDATE_GAME_MODE: u8 = 0x04;
    pub const UPDATE_LISTED: u8 = 0x08;
    pub const UPDATE_LATENCY: u8 = 0x10;
    pub const UPDATE_DISPLAY_NAME: u8 = 0x20;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    pub session_id: Uuid,
    pub expires_at: i64,
    pub public_key: Vec<u8>,
    pub key_signature: Vec<u8>,
}

/// One player in a PlayerInfoUpdate. Each optional field is present exactly
/// when its action bit is set on the packet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerInfoEntry {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub properties: Vec<ProfileProperty>,
    /// Inner `None` when the action is set but the player has no session.
    pub chat_session: Option<Option<ChatSession>>,
    pub game_mode: Option<i32>,
    pub listed: Option<bool>,
    pub ping: Option<i32>,
    pub display_name: Option<Option<NbtValue>>,
}

impl PlayerInfoEntry {
    pub fn display_name_text(&self) -> Option<String> {
        self.display_name.as_ref()?.as_ref().map(nbt_text)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerInfoUpdate {
    pub actions: u8,
    pub players: Vec<PlayerInfoEntry>,
}

impl PacketBody for PlayerInfoUpdate {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        use player_info_actions::*;

        let actions = buf.read_u8()?;
        self.actions = actions;
        self.players = buf.read_array(|buf| {
            let mut entry = PlayerInfoEntry {
                uuid: buf.read_uuid()?,
                ..Default::default()
            };
            if actions & ADD_PLAYER != 0 {
                entry.name = Some(buf.read_string(16)?);
                entry.properties = buf.read_array(read_profile_property)?;
            }
            if actions & INITIALIZE_CHAT != 0 {
                entry.chat_session = Some(buf.read_option(|buf| {
                    Ok(ChatSession {
                        session_id: buf.read_uuid()?,
                        expires_at: buf.read_i64()?,
                        public_key: buf.read_byte_array(512)?,
                        key_signature: buf.read_byte_array(4096)?,
                    })
                })?);
            }
            if actions & UPDATE_GAME_MODE != 0 {
                entry.game_mode = Some(buf.read_varint()?);
            }
            if actions & UPDATE_LISTED != 0 {
                entry.listed = Some(buf.read_bool()?);
            }
            if actions & UPDATE_LATENCY != 0 {
                entry.ping = Some(buf.read_varint()?);
            }
            if actions & UPDATE_DISPLAY_NAME != 0 {
                entry.display_name = Some(buf.read_option(|buf| buf.read_nbt())?);
            }
            Ok(entry)
        })?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        use player_info_actions::*;

        buf.put_u8(self.actions);
        write_varint(buf, self.players.len() as i32);
        for entry in &self.players {
            write_uuid(buf, &entry.uuid);
            if self.actions & ADD_PLAYER != 0 {
                write_string(buf, entry.name.as_deref().unwrap_or_default());
                write_varint(buf, entry.properties.len() as i32);
                for prop in &entry.properties {
                    write_profile_property(buf, prop);
                }
            }
            if self.actions & INITIALIZE_CHAT != 0 {
                match entry.chat_session.as_ref().and_then(|s| s.as_ref()) {
                    Some(session) => {
                        write_bool(buf, true);
                        write_uuid(buf, &session.session_id);
                        buf.put_i64(session.expires_at);
                        write_byte_array(buf, &session.public_key);
                        write_byte_array(buf, &session.key_signature);
                    }
                    None => write_bool(buf, false),
                }
            }
            if self.actions & UPDATE_GAME_MODE != 0 {
                write_varint(buf, entry.game_mode.unwrap_or_default());
            }
            if self.actions & UPDATE_LISTED != 0 {
                write_bool(buf, entry.listed.unwrap_or_default());
            }
            if self.actions & UPDATE_LATENCY != 0 {
                write_varint(buf, entry.ping.unwrap_or_default());
            }
            if self.actions & UPDATE_DISPLAY_NAME != 0 {
                match entry.display_name.as_ref().and_then(|n| n.as_ref()) {
                    Some(name) => {
                        write_bool(buf, true);
                        write_nbt(buf, name);
                    }
                    None => write_bool(buf, false),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SynchronizePlayerPosition {
    pub position: Vec3d,
    pub yaw: f32,
    pub pitch: f32,
    /// Bit set: x, y, z, yaw, pitch are relative when their bit is set.
    pub flags: u8,
    pub teleport_id: i32,
}

impl PacketBody for SynchronizePlayerPosition {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.position = read_vec3d(buf)?;
        self.yaw = buf.read_f32()?;
        self.pitch = buf.read_f32()?;
        self.flags = buf.read_u8()?;
        self.teleport_id = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_vec3d(buf, &self.position);
        buf.put_f32(self.yaw);
        buf.put_f32(self.pitch);
        buf.put_u8(self.flags);
        write_varint(buf, self.teleport_id);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveEntities {
    pub entity_ids: Vec<i32>,
}

impl PacketBody for RemoveEntities {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_ids = buf.read_array(|buf| buf.read_varint())?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_ids.len() as i32);
        for id in &self.entity_ids {
            write_varint(buf, *id);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetHeadRotation {
    pub entity_id: i32,
    pub head_yaw: u8,
}

impl PacketBody for SetHeadRotation {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_varint()?;
        self.head_yaw = buf.read_angle()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_id);
        buf.put_u8(self.head_yaw);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetHeldItemClientbound {
    pub slot: i8,
}

impl PacketBody for SetHeldItemClientbound {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.slot = buf.read_i8()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i8(self.slot);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetCenterChunk {
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl PacketBody for SetCenterChunk {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.chunk_x = buf.read_varint()?;
        self.chunk_z = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.chunk_x);
        write_varint(buf, self.chunk_z);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetDefaultSpawnPosition {
    pub position: BlockPos,
    pub angle: f32,
}

impl PacketBody for SetDefaultSpawnPosition {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.position = buf.read_position()?;
        self.angle = buf.read_f32()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_position(buf, &self.position);
        buf.put_f32(self.angle);
    }
}

/// Velocity in 1/8000 of a block per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetEntityVelocity {
    pub entity_id: i32,
    pub velocity_x: i16,
    pub velocity_y: i16,
    pub velocity_z: i16,
}

impl PacketBody for SetEntityVelocity {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_varint()?;
        self.velocity_x = buf.read_i16()?;
        self.velocity_y = buf.read_i16()?;
        self.velocity_z = buf.read_i16()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_id);
        buf.put_i16(self.velocity_x);
        buf.put_i16(self.velocity_y);
        buf.put_i16(self.velocity_z);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetHealth {
    pub health: f32,
    pub food: i32,
    pub saturation: f32,
}

impl PacketBody for SetHealth {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.health = buf.read_f32()?;
        self.food = buf.read_varint()?;
        self.saturation = buf.read_f32()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_f32(self.health);
        write_varint(buf, self.food);
        buf.put_f32(self.saturation);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateTime {
    pub world_age: i64,
    /// Negative when the daylight cycle is frozen.
    pub time_of_day: i64,
}

impl PacketBody for UpdateTime {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.world_age = buf.read_i64()?;
        self.time_of_day = buf.read_i64()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i64(self.world_age);
        buf.put_i64(self.time_of_day);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemChatMessage {
    pub content: NbtValue,
    /// Shown above the hotbar instead of in chat.
    pub overlay: bool,
}

impl SystemChatMessage {
    pub fn text(&self) -> String {
        nbt_text(&self.content)
    }
}

impl PacketBody for SystemChatMessage {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.content = buf.read_nbt()?;
        self.overlay = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_nbt(buf, &self.content);
        write_bool(buf, self.overlay);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TeleportEntity {
    pub entity_id: i32,
    pub position: Vec3d,
    pub yaw: u8,
    pub pitch: u8,
    pub on_ground: bool,
}

impl PacketBody for TeleportEntity {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.entity_id = buf.read_varint()?;
        self.position = read_vec3d(buf)?;
        self.yaw = buf.read_angle()?;
        self.pitch = buf.read_angle()?;
        self.on_ground = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.entity_id);
        write_vec3d(buf, &self.position);
        buf.put_u8(self.yaw);
        buf.put_u8(self.pitch);
        write_bool(buf, self.on_ground);
    }
}
