use crate::packets::*;
use crate::{DataBuffer, DecodeResult, Direction, ProtocolState};
use bytes::BytesMut;
use std::any::Any;
use std::fmt;

/// The fields of one packet shape. `decode` populates a default value in
/// place from a cursor positioned just after the packet id.
pub trait PacketBody: Default + fmt::Debug + Send + Sync {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()>;
    fn encode(&self, buf: &mut BytesMut);
}

/// A packet kind defined outside this crate (plugin channels, modded
/// servers, protocol versions newer than the built-in catalogue).
/// Registered with [`crate::PacketRegistryBuilder::register`].
pub trait CustomPacket: fmt::Debug + Send + Sync + Any {
    fn name(&self) -> &'static str;
    fn state(&self) -> ProtocolState;
    fn direction(&self) -> Direction;
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()>;
    fn encode(&self, buf: &mut BytesMut);
    fn as_any(&self) -> &dyn Any;
}

macro_rules! define_packets {
    ($($variant:ident($body:ty) => $state:ident, $direction:ident;)*) => {
        /// One decoded message. Exhaustive over the built-in catalogue, with
        /// `Custom` as the extension point.
        #[derive(Debug)]
        pub enum Packet {
            $($variant($body),)*
            Custom(Box<dyn CustomPacket>),
        }

        /// Fieldless tag for each built-in packet variant.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum PacketKind {
            $($variant,)*
        }

        impl PacketKind {
            pub const ALL: &'static [PacketKind] = &[$(PacketKind::$variant,)*];

            pub fn name(self) -> &'static str {
                match self {
                    $(PacketKind::$variant => stringify!($variant),)*
                }
            }

            pub fn state(self) -> ProtocolState {
                match self {
                    $(PacketKind::$variant => ProtocolState::$state,)*
                }
            }

            pub fn direction(self) -> Direction {
                match self {
                    $(PacketKind::$variant => Direction::$direction,)*
                }
            }

            /// An empty packet of this kind, ready to be decoded into.
            pub fn empty(self) -> Packet {
                match self {
                    $(PacketKind::$variant => Packet::$variant(<$body>::default()),)*
                }
            }
        }

        impl Packet {
            /// `None` for custom packets.
            pub fn kind(&self) -> Option<PacketKind> {
                match self {
                    $(Packet::$variant(_) => Some(PacketKind::$variant),)*
                    Packet::Custom(_) => None,
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(Packet::$variant(_) => stringify!($variant),)*
                    Packet::Custom(p) => p.name(),
                }
            }

            pub fn state(&self) -> ProtocolState {
                match self {
                    $(Packet::$variant(_) => ProtocolState::$state,)*
                    Packet::Custom(p) => p.state(),
                }
            }

            pub fn direction(&self) -> Direction {
                match self {
                    $(Packet::$variant(_) => Direction::$direction,)*
                    Packet::Custom(p) => p.direction(),
                }
            }

            pub fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
                match self {
                    $(Packet::$variant(body) => body.decode(buf),)*
                    Packet::Custom(p) => p.decode(buf),
                }
            }

            /// Write the body only; the id is the registry's business.
            pub fn encode(&self, buf: &mut BytesMut) {
                match self {
                    $(Packet::$variant(body) => body.encode(buf),)*
                    Packet::Custom(p) => p.encode(buf),
                }
            }
        }
    };
}

define_packets! {
    // === Handshaking ===
    Handshake(Handshake) => Handshaking, Serverbound;

    // === Status ===
    StatusRequest(EmptyPacket) => Status, Serverbound;
    PingRequest(Ping) => Status, Serverbound;
    StatusResponse(StatusResponse) => Status, Clientbound;
    PongResponse(Ping) => Status, Clientbound;

    // === Login (serverbound) ===
    LoginStart(LoginStart) => Login, Serverbound;
    EncryptionResponse(EncryptionResponse) => Login, Serverbound;
    LoginPluginResponse(LoginPluginResponse) => Login, Serverbound;
    LoginAcknowledged(EmptyPacket) => Login, Serverbound;

    // === Login (clientbound) ===
    LoginDisconnect(LoginDisconnect) => Login, Clientbound;
    EncryptionRequest(EncryptionRequest) => Login, Clientbound;
    LoginSuccess(LoginSuccess) => Login, Clientbound;
    SetCompression(SetCompression) => Login, Clientbound;
    LoginPluginRequest(LoginPluginRequest) => Login, Clientbound;

    // === Configuration (serverbound) ===
    ClientInformation(ClientInformation) => Configuration, Serverbound;
    ConfigPluginMessageServerbound(PluginMessage) => Configuration, Serverbound;
    FinishConfigurationAck(EmptyPacket) => Configuration, Serverbound;
    ConfigKeepAliveServerbound(KeepAlive) => Configuration, Serverbound;
    ConfigPong(PingId) => Configuration, Serverbound;
    KnownPacksResponse(KnownPacks) => Configuration, Serverbound;

    // === Configuration (clientbound) ===
    ConfigPluginMessageClientbound(PluginMessage) => Configuration, Clientbound;
    ConfigDisconnect(NbtDisconnect) => Configuration, Clientbound;
    FinishConfiguration(EmptyPacket) => Configuration, Clientbound;
    ConfigKeepAliveClientbound(KeepAlive) => Configuration, Clientbound;
    ConfigPing(PingId) => Configuration, Clientbound;
    RegistryData(RegistryData) => Configuration, Clientbound;
    FeatureFlags(FeatureFlags) => Configuration, Clientbound;
    KnownPacksRequest(KnownPacks) => Configuration, Clientbound;

    // === Play (serverbound) ===
    ConfirmTeleportation(ConfirmTeleportation) => Play, Serverbound;
    ChatCommand(ChatCommand) => Play, Serverbound;
    ChatMessage(ChatMessage) => Play, Serverbound;
    ChunkBatchReceived(ChunkBatchReceived) => Play, Serverbound;
    ClientStatus(ClientStatus) => Play, Serverbound;
    PlayClientInformation(ClientInformation) => Play, Serverbound;
    AcknowledgeConfiguration(EmptyPacket) => Play, Serverbound;
    CloseContainer(CloseContainer) => Play, Serverbound;
    PlayPluginMessageServerbound(PluginMessage) => Play, Serverbound;
    PlayKeepAliveServerbound(KeepAlive) => Play, Serverbound;
    SetPlayerPosition(SetPlayerPosition) => Play, Serverbound;
    SetPlayerPositionAndRotation(SetPlayerPositionAndRotation) => Play, Serverbound;
    SetPlayerRotation(SetPlayerRotation) => Play, Serverbound;
    SetPlayerOnGround(SetPlayerOnGround) => Play, Serverbound;
    PlayPong(PingId) => Play, Serverbound;
    PlayerAction(PlayerAction) => Play, Serverbound;
    SetHeldItemServerbound(SetHeldItemServerbound) => Play, Serverbound;
    SetCreativeModeSlot(SetCreativeModeSlot) => Play, Serverbound;
    SwingArm(SwingArm) => Play, Serverbound;
    UseItemOn(UseItemOn) => Play, Serverbound;
    UseItem(UseItem) => Play, Serverbound;

    // === Play (clientbound) ===
    BundleDelimiter(EmptyPacket) => Play, Clientbound;
    SpawnEntity(SpawnEntity) => Play, Clientbound;
    AcknowledgeBlockChange(AcknowledgeBlockChange) => Play, Clientbound;
    SetBlockDestroyStage(SetBlockDestroyStage) => Play, Clientbound;
    BlockEntityData(BlockEntityData) => Play, Clientbound;
    BlockUpdate(BlockUpdate) => Play, Clientbound;
    ChunkBatchFinished(ChunkBatchFinished) => Play, Clientbound;
    ChunkBatchStart(EmptyPacket) => Play, Clientbound;
    SetContainerContent(SetContainerContent) => Play, Clientbound;
    SetContainerSlot(SetContainerSlot) => Play, Clientbound;
    PlayPluginMessageClientbound(PluginMessage) => Play, Clientbound;
    PlayDisconnect(NbtDisconnect) => Play, Clientbound;
    UnloadChunk(UnloadChunk) => Play, Clientbound;
    GameEvent(GameEvent) => Play, Clientbound;
    PlayKeepAliveClientbound(KeepAlive) => Play, Clientbound;
    ChunkDataAndUpdateLight(ChunkDataAndUpdateLight) => Play, Clientbound;
    PlayLogin(PlayLogin) => Play, Clientbound;
    PlayPing(PingId) => Play, Clientbound;
    UpdateEntityPosition(UpdateEntityPosition) => Play, Clientbound;
    UpdateEntityPositionAndRotation(UpdateEntityPositionAndRotation) => Play, Clientbound;
    UpdateEntityRotation(UpdateEntityRotation) => Play, Clientbound;
    PlayerInfoRemove(PlayerInfoRemove) => Play, Clientbound;
    PlayerInfoUpdate(PlayerInfoUpdate) => Play, Clientbound;
    SynchronizePlayerPosition(SynchronizePlayerPosition) => Play, Clientbound;
    RemoveEntities(RemoveEntities) => Play, Clientbound;
    SetHeadRotation(SetHeadRotation) => Play, Clientbound;
    SetHeldItemClientbound(SetHeldItemClientbound) => Play, Clientbound;
    SetCenterChunk(SetCenterChunk) => Play, Clientbound;
    SetDefaultSpawnPosition(SetDefaultSpawnPosition) => Play, Clientbound;
    SetEntityVelocity(SetEntityVelocity) => Play, Clientbound;
    SetHealth(SetHealth) => Play, Clientbound;
    UpdateTime(UpdateTime) => Play, Clientbound;
    StartConfiguration(EmptyPacket) => Play, Clientbound;
    SystemChatMessage(SystemChatMessage) => Play, Clientbound;
    TeleportEntity(TeleportEntity) => Play, Clientbound;
}

impl Packet {
    /// Borrow a custom packet as its concrete type.
    pub fn downcast_custom<T: CustomPacket>(&self) -> Option<&T> {
        match self {
            Packet::Custom(p) => p.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// The state the sender's connection is in once this packet has been
    /// handled, if the packet switches states.
    pub fn next_state(&self) -> Option<ProtocolState> {
        match self {
            Packet::Handshake(handshake) => handshake.target_state(),
            Packet::LoginSuccess(_) | Packet::LoginAcknowledged(_) => {
                Some(ProtocolState::Configuration)
            }
            Packet::FinishConfiguration(_) | Packet::FinishConfigurationAck(_) => {
                Some(ProtocolState::Play)
            }
            Packet::StartConfiguration(_) | Packet::AcknowledgeConfiguration(_) => {
                Some(ProtocolState::Configuration)
            }
            _ => None,
        }
    }
}
