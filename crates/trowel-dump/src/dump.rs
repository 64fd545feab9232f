use crate::config::DumpConfig;
use anyhow::bail;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use trowel_block::{AnyBlockEntity, Nameable};
use trowel_protocol_core::{
    DataBuffer, DecodeError, Decoded, OwnedPacket, Packet, PacketFactory, ProtocolState,
    UnrecognizedPacket,
};
use trowel_nbt::NbtValue;
use trowel_types::BlockPos;

/// Counters gathered while walking a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpStats {
    pub decoded: usize,
    pub unrecognized: usize,
    pub failed: usize,
    pub block_entities: usize,
    pub by_name: BTreeMap<&'static str, usize>,
    /// Set when the stream switched on compression and decoding stopped.
    pub stopped_at_compression: bool,
}

/// Walks a stream of length-prefixed packets travelling in one direction,
/// following state switches as they go past.
pub struct Dumper {
    factory: PacketFactory,
    state: ProtocolState,
    config: DumpConfig,
    stats: DumpStats,
}

impl Dumper {
    pub fn new(factory: PacketFactory, state: ProtocolState, config: DumpConfig) -> Self {
        Self {
            factory,
            state,
            config,
            stats: DumpStats::default(),
        }
    }

    pub fn state(&self) -> ProtocolState {
        self.state
    }

    pub fn run(&mut self, data: &[u8]) -> anyhow::Result<&DumpStats> {
        let mut buf = DataBuffer::with_limits(data, self.config.limits);
        while buf.has_remaining() {
            let offset = buf.offset();
            match self.factory.decode_frame(self.state, &mut buf) {
                Ok(Decoded::Packet(packet)) => {
                    if !self.handle_packet(offset, packet) {
                        self.stats.stopped_at_compression = true;
                        break;
                    }
                }
                Ok(Decoded::Unrecognized(unknown)) => {
                    self.report_unrecognized(offset, &unknown);
                    buf.skip(unknown.length)?;
                }
                Err(err) => {
                    self.stats.failed += 1;
                    if self.config.stop_on_error {
                        bail!("Decode error at offset {} in {}: {}", offset, self.state, err);
                    }
                    warn!("Decode error at offset {} in {}: {}", offset, self.state, err);
                    if skip_frame(&mut buf).is_err() {
                        warn!("Truncated frame at offset {}, stopping", offset);
                        break;
                    }
                }
            }
        }
        Ok(&self.stats)
    }

    /// Returns false once the stream can no longer be read as plain frames.
    fn handle_packet(&mut self, offset: usize, packet: OwnedPacket) -> bool {
        self.stats.decoded += 1;
        *self.stats.by_name.entry(packet.name()).or_insert(0) += 1;
        info!(
            "[{}] @{} {} ({:#04x})",
            self.state,
            offset,
            packet.name(),
            packet.id()
        );
        debug!("{:?}", packet.packet());

        match packet.packet() {
            Packet::SetCompression(compression) if compression.threshold >= 0 => {
                warn!(
                    "Compression enabled (threshold {}), later frames cannot be decoded",
                    compression.threshold
                );
                return false;
            }
            Packet::BlockEntityData(update) => {
                self.inspect_block_entity(
                    update.block_entity_type,
                    update.position,
                    update.data.as_ref(),
                );
            }
            Packet::ChunkDataAndUpdateLight(chunk) => {
                for entity in &chunk.block_entities {
                    self.inspect_block_entity(
                        entity.block_entity_type,
                        entity.position(chunk.chunk_x, chunk.chunk_z),
                        entity.data.as_ref(),
                    );
                }
            }
            _ => {}
        }

        if let Some(next) = packet.next_state() {
            if self.state.can_transition_to(next) {
                info!("State {} -> {}", self.state, next);
                self.state = next;
            } else {
                warn!(
                    "{} asks for {} -> {}, staying in {}",
                    packet.name(),
                    self.state,
                    next,
                    self.state
                );
            }
        }
        true
    }

    fn inspect_block_entity(&mut self, type_id: i32, position: BlockPos, nbt: Option<&NbtValue>) {
        match AnyBlockEntity::from_packet(type_id, position, nbt) {
            Ok(Some(entity)) => {
                self.stats.block_entities += 1;
                let kind = entity.kind();
                info!(
                    "  {} \"{}\" at {}: {} stacks",
                    kind,
                    entity.as_nameable().display_name(kind.path()),
                    entity.position(),
                    entity.as_inventory().inventory().items().count()
                );
            }
            Ok(None) => debug!("  Block entity type {} at {} not modelled", type_id, position),
            Err(e) => warn!("  Bad block entity NBT at {}: {}", position, e),
        }
    }

    fn report_unrecognized(&mut self, offset: usize, unknown: &UnrecognizedPacket) {
        self.stats.unrecognized += 1;
        let preview: Vec<String> = unknown
            .payload
            .iter()
            .take(self.config.preview_bytes)
            .map(|b| format!("{b:02x}"))
            .collect();
        info!(
            "[{}] @{} unrecognized {:#04x}, {} bytes: {}",
            unknown.state,
            offset,
            unknown.id,
            unknown.length,
            preview.join(" ")
        );
    }
}

/// Step over one frame without decoding it.
fn skip_frame(buf: &mut DataBuffer<'_>) -> Result<(), DecodeError> {
    buf.transaction(|buf| {
        let length = buf.read_varint()?;
        if length < 0 {
            return Err(DecodeError::NegativeLength(length));
        }
        buf.skip(length as usize)
    })
}
