use trowel_protocol_core::*;

pub const PROTOCOL_VERSION: i32 = 767;

/// Packet ids for protocol 767.
pub struct V1_21Adapter;

impl V1_21Adapter {
    pub fn new() -> Self {
        Self
    }

    /// The `(kind, id)` table for one direction.
    pub fn packet_ids(direction: Direction) -> &'static [(PacketKind, i32)] {
        match direction {
            Direction::Serverbound => SERVERBOUND,
            Direction::Clientbound => CLIENTBOUND,
        }
    }
}

impl Default for V1_21Adapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProtocolAdapter for V1_21Adapter {
    fn protocol_version(&self) -> i32 {
        PROTOCOL_VERSION
    }

    fn register_packets(
        &self,
        direction: Direction,
        builder: &mut PacketRegistryBuilder,
    ) -> Result<(), RegistryError> {
        for &(kind, id) in Self::packet_ids(direction) {
            builder.register_kind(kind, id)?;
        }
        tracing::debug!(
            "Registered {} {:?} packets for protocol {}",
            Self::packet_ids(direction).len(),
            direction,
            PROTOCOL_VERSION
        );
        Ok(())
    }
}

// === Packet ID tables ===

const SERVERBOUND: &[(PacketKind, i32)] = &[
    // Handshaking
    (PacketKind::Handshake, 0x00),
    // Status
    (PacketKind::StatusRequest, 0x00),
    (PacketKind::PingRequest, 0x01),
    // Login
    (PacketKind::LoginStart, 0x00),
    (PacketKind::EncryptionResponse, 0x01),
    (PacketKind::LoginPluginResponse, 0x02),
    (PacketKind::LoginAcknowledged, 0x03),
    // Configuration
    (PacketKind::ClientInformation, 0x00),
    (PacketKind::ConfigPluginMessageServerbound, 0x02),
    (PacketKind::FinishConfigurationAck, 0x03),
    (PacketKind::ConfigKeepAliveServerbound, 0x04),
    (PacketKind::ConfigPong, 0x05),
    (PacketKind::KnownPacksResponse, 0x07),
    // Play
    (PacketKind::ConfirmTeleportation, 0x00),
    (PacketKind::ChatCommand, 0x04),
    (PacketKind::ChatMessage, 0x06),
    (PacketKind::ChunkBatchReceived, 0x08),
    (PacketKind::ClientStatus, 0x09),
    (PacketKind::PlayClientInformation, 0x0A),
    (PacketKind::AcknowledgeConfiguration, 0x0C),
    (PacketKind::CloseContainer, 0x0F),
    (PacketKind::PlayPluginMessageServerbound, 0x12),
    (PacketKind::PlayKeepAliveServerbound, 0x18),
    (PacketKind::SetPlayerPosition, 0x1A),
    (PacketKind::SetPlayerPositionAndRotation, 0x1B),
    (PacketKind::SetPlayerRotation, 0x1C),
    (PacketKind::SetPlayerOnGround, 0x1D),
    (PacketKind::PlayerAction, 0x24),
    (PacketKind::PlayPong, 0x27),
    (PacketKind::SetHeldItemServerbound, 0x2F),
    (PacketKind::SetCreativeModeSlot, 0x32),
    (PacketKind::SwingArm, 0x36),
    (PacketKind::UseItemOn, 0x38),
    (PacketKind::UseItem, 0x39),
];

const CLIENTBOUND: &[(PacketKind, i32)] = &[
    // Status
    (PacketKind::StatusResponse, 0x00),
    (PacketKind::PongResponse, 0x01),
    // Login
    (PacketKind::LoginDisconnect, 0x00),
    (PacketKind::EncryptionRequest, 0x01),
    (PacketKind::LoginSuccess, 0x02),
    (PacketKind::SetCompression, 0x03),
    (PacketKind::LoginPluginRequest, 0x04),
    // Configuration
    (PacketKind::ConfigPluginMessageClientbound, 0x01),
    (PacketKind::ConfigDisconnect, 0x02),
    (PacketKind::FinishConfiguration, 0x03),
    (PacketKind::ConfigKeepAliveClientbound, 0x04),
    (PacketKind::ConfigPing, 0x05),
    (PacketKind::RegistryData, 0x07),
    (PacketKind::FeatureFlags, 0x0C),
    (PacketKind::KnownPacksRequest, 0x0E),
    // Play
    (PacketKind::BundleDelimiter, 0x00),
    (PacketKind::SpawnEntity, 0x01),
    (PacketKind::AcknowledgeBlockChange, 0x05),
    (PacketKind::SetBlockDestroyStage, 0x06),
    (PacketKind::BlockEntityData, 0x07),
    (PacketKind::BlockUpdate, 0x09),
    (PacketKind::ChunkBatchFinished, 0x0C),
    (PacketKind::ChunkBatchStart, 0x0D),
    (PacketKind::SetContainerContent, 0x13),
    (PacketKind::SetContainerSlot, 0x15),
    (PacketKind::PlayPluginMessageClientbound, 0x19),
    (PacketKind::PlayDisconnect, 0x1D),
    (PacketKind::UnloadChunk, 0x21),
    (PacketKind::GameEvent, 0x22),
    (PacketKind::PlayKeepAliveClientbound, 0x26),
    (PacketKind::ChunkDataAndUpdateLight, 0x27),
    (PacketKind::PlayLogin, 0x2B),
    (PacketKind::UpdateEntityPosition, 0x2E),
    (PacketKind::UpdateEntityPositionAndRotation, 0x2F),
    (PacketKind::UpdateEntityRotation, 0x30),
    (PacketKind::PlayPing, 0x35),
    (PacketKind::PlayerInfoRemove, 0x3D),
    (PacketKind::PlayerInfoUpdate, 0x3E),
    (PacketKind::SynchronizePlayerPosition, 0x40),
    (PacketKind::RemoveEntities, 0x42),
    (PacketKind::SetHeadRotation, 0x48),
    (PacketKind::SetHeldItemClientbound, 0x53),
    (PacketKind::SetCenterChunk, 0x54),
    (PacketKind::SetDefaultSpawnPosition, 0x56),
    (PacketKind::SetEntityVelocity, 0x5A),
    (PacketKind::SetHealth, 0x5D),
    (PacketKind::UpdateTime, 0x64),
    (PacketKind::StartConfiguration, 0x69),
    (PacketKind::SystemChatMessage, 0x6C),
    (PacketKind::TeleportEntity, 0x70),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_an_id() {
        let adapter = V1_21Adapter::new();
        let serverbound = adapter.registry(Direction::Serverbound).unwrap();
        let clientbound = adapter.registry(Direction::Clientbound).unwrap();
        for kind in PacketKind::ALL {
            let registry = match kind.direction() {
                Direction::Serverbound => &serverbound,
                Direction::Clientbound => &clientbound,
            };
            assert!(
                registry.id_of_kind(*kind).is_some(),
                "{} has no id",
                kind.name()
            );
        }
        assert_eq!(serverbound.len() + clientbound.len(), PacketKind::ALL.len());
    }

    #[test]
    fn test_known_ids() {
        let adapter = V1_21Adapter::new();
        let clientbound = adapter.registry(Direction::Clientbound).unwrap();
        assert_eq!(clientbound.id_of_kind(PacketKind::PlayLogin), Some(0x2B));
        assert_eq!(clientbound.id_of_kind(PacketKind::SystemChatMessage), Some(0x6C));
        assert_eq!(
            clientbound.lookup(ProtocolState::Configuration, 0x07).unwrap().name,
            "RegistryData"
        );
        assert_eq!(clientbound.protocol_version(), 767);
        assert_eq!(clientbound.direction(), Direction::Clientbound);
    }
}
