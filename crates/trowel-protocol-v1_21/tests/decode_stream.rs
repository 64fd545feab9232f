//! End-to-end decoding against the protocol 767 tables.

use bytes::{BufMut, BytesMut};
use std::any::Any;
use std::sync::Arc;
use trowel_nbt::{nbt_compound, NbtValue};
use trowel_protocol_core::*;
use trowel_protocol_v1_21::V1_21Adapter;
use trowel_types::{BlockPos, GameMode, GameProfile, Identifier, ItemStack, ProfileProperty};
use uuid::Uuid;

fn serverbound() -> PacketFactory {
    V1_21Adapter::new()
        .factory(Direction::Serverbound, DecodeLimits::default())
        .unwrap()
}

fn clientbound() -> PacketFactory {
    V1_21Adapter::new()
        .factory(Direction::Clientbound, DecodeLimits::default())
        .unwrap()
}

fn expect_packet(decoded: Decoded) -> OwnedPacket {
    match decoded {
        Decoded::Packet(p) => p,
        Decoded::Unrecognized(u) => panic!("unrecognized {u:?}"),
    }
}

/// Encode through the factory and decode the result again.
fn reencode(factory: &PacketFactory, packet: Packet) -> OwnedPacket {
    let state = packet.state();
    let bytes = factory.encode(&packet).unwrap();
    let decoded = expect_packet(factory.create_packet_from_slice(state, &bytes).unwrap());
    assert_eq!(decoded.name(), packet.name());
    decoded
}

#[test]
fn handshake_from_raw_bytes() {
    let mut data = vec![0x00, 0xF2, 0x05, 16];
    data.extend_from_slice(b"play.example.com");
    data.extend_from_slice(&[0x63, 0xDD, 0x02]);
    assert_eq!(data.len(), 23);

    let factory = serverbound();
    let mut buf = DataBuffer::new(&data);
    let packet = expect_packet(
        factory
            .create_packet(ProtocolState::Handshaking, &mut buf, data.len())
            .unwrap(),
    );
    assert_eq!(buf.offset(), 23);
    let Packet::Handshake(handshake) = packet.packet() else {
        panic!("expected handshake, got {packet:?}");
    };
    assert_eq!(handshake.protocol_version, 754);
    assert_eq!(handshake.server_address, "play.example.com");
    assert_eq!(handshake.server_port, 25565);
    assert_eq!(handshake.next_state, 2);
    assert_eq!(handshake.target_state(), Some(ProtocolState::Login));
}

#[test]
fn unknown_play_id_then_resync() {
    let factory = clientbound();
    let mut stream = BytesMut::new();
    // 0x7F is not a 767 clientbound play id.
    stream.put_slice(&[0x7F, 1, 2, 3, 4]);
    let keep_alive = factory
        .encode(&Packet::PlayKeepAliveClientbound(KeepAlive { id: 99 }))
        .unwrap();
    stream.put_slice(&keep_alive);

    let mut buf = DataBuffer::new(&stream);
    match factory.create_packet(ProtocolState::Play, &mut buf, 5).unwrap() {
        Decoded::Unrecognized(u) => {
            assert_eq!(u.state, ProtocolState::Play);
            assert_eq!(u.id, 0x7F);
            assert_eq!(u.length, 5);
            assert_eq!(u.payload, vec![1, 2, 3, 4]);
        }
        Decoded::Packet(p) => panic!("unexpected {p:?}"),
    }
    assert_eq!(buf.offset(), 0);
    buf.skip(5).unwrap();

    let next = expect_packet(
        factory
            .create_packet(ProtocolState::Play, &mut buf, keep_alive.len())
            .unwrap(),
    );
    assert!(matches!(
        next.packet(),
        Packet::PlayKeepAliveClientbound(KeepAlive { id: 99 })
    ));
    assert!(!buf.has_remaining());
}

#[test]
fn same_id_differs_by_direction_and_state() {
    let sb = serverbound();
    let cb = clientbound();
    let data = [0x00];
    let a = expect_packet(sb.create_packet_from_slice(ProtocolState::Status, &data).unwrap());
    assert_eq!(a.name(), "StatusRequest");
    let b = expect_packet(cb.create_packet_from_slice(ProtocolState::Play, &data).unwrap());
    assert_eq!(b.name(), "BundleDelimiter");
    assert!(matches!(
        cb.create_packet_from_slice(ProtocolState::Handshaking, &data).unwrap(),
        Decoded::Unrecognized(_)
    ));
}

#[test]
fn login_success_roundtrip() {
    let factory = clientbound();
    let profile = GameProfile {
        uuid: Uuid::from_u128(0x0123_4567_89ab_cdef),
        name: "Alex".into(),
        properties: vec![ProfileProperty {
            name: "textures".into(),
            value: "eyJ0ZXh0dXJlcyI6e319".into(),
            signature: None,
        }],
    };
    let decoded = reencode(
        &factory,
        Packet::LoginSuccess(LoginSuccess {
            profile: profile.clone(),
            strict_error_handling: false,
        }),
    );
    assert_eq!(decoded.id(), 0x02);
    let Packet::LoginSuccess(body) = decoded.packet() else {
        panic!("wrong variant");
    };
    assert_eq!(body.profile, profile);
}

#[test]
fn play_login_roundtrip() {
    let factory = clientbound();
    let original = PlayLogin {
        entity_id: 42,
        dimension_names: vec![Identifier::minecraft("overworld")],
        max_players: 100,
        view_distance: 12,
        simulation_distance: 10,
        enable_respawn_screen: true,
        dimension_name: Identifier::minecraft("overworld"),
        hashed_seed: 0x1234_5678,
        game_mode: GameMode::Survival,
        previous_game_mode: -1,
        portal_cooldown: 0,
        ..Default::default()
    };
    let decoded = reencode(&factory, Packet::PlayLogin(original.clone()));
    assert!(matches!(decoded.packet(), Packet::PlayLogin(body) if *body == original));
}

#[test]
fn registry_data_roundtrip() {
    let factory = clientbound();
    let original = RegistryData {
        registry_id: Identifier::minecraft("dimension_type"),
        entries: vec![RegistryDataEntry {
            id: Identifier::minecraft("overworld"),
            data: Some(nbt_compound! {
                "has_skylight" => NbtValue::Byte(1),
                "min_y" => NbtValue::Int(-64),
                "height" => NbtValue::Int(384),
                "effects" => NbtValue::String("minecraft:overworld".into())
            }),
        }],
    };
    let decoded = reencode(&factory, Packet::RegistryData(original.clone()));
    assert!(matches!(decoded.packet(), Packet::RegistryData(body) if *body == original));
}

#[test]
fn container_content_roundtrip() {
    let factory = clientbound();
    let original = SetContainerContent {
        window_id: 0,
        state_id: 3,
        slots: vec![None, Some(ItemStack::new(1, 64)), None, Some(ItemStack::new(812, 1))],
        carried_item: None,
    };
    let decoded = reencode(&factory, Packet::SetContainerContent(original.clone()));
    assert!(matches!(decoded.packet(), Packet::SetContainerContent(body) if *body == original));
}

#[test]
fn block_update_and_player_action() {
    let cb = clientbound();
    let update = BlockUpdate {
        position: BlockPos::new(-30_000_000 + 1, -64, 29_999_999),
        block_id: 1,
    };
    let decoded = reencode(&cb, Packet::BlockUpdate(update));
    assert!(matches!(decoded.packet(), Packet::BlockUpdate(body) if *body == update));

    let sb = serverbound();
    let action = PlayerAction {
        status: 0,
        position: BlockPos::new(1, 2, 3),
        face: 1,
        sequence: 8,
    };
    let decoded = reencode(&sb, Packet::PlayerAction(action));
    assert_eq!(decoded.id(), 0x24);
    assert!(matches!(decoded.packet(), Packet::PlayerAction(body) if *body == action));
}

#[test]
fn short_declared_length_is_reported() {
    let factory = serverbound();
    let bytes = factory
        .encode(&Packet::SetPlayerPosition(SetPlayerPosition::default()))
        .unwrap();
    // Drop the trailing on_ground byte.
    let cut = &bytes[..bytes.len() - 1];
    let mut buf = DataBuffer::new(cut);
    let err = factory
        .create_packet(ProtocolState::Play, &mut buf, cut.len())
        .unwrap_err();
    assert_eq!(
        err,
        DecodeError::TrailingOrMissingData {
            state: ProtocolState::Play,
            id: 0x1A,
            declared: cut.len(),
            consumed: bytes.len(),
        }
    );
    assert_eq!(buf.offset(), 0);
}

#[test]
fn live_packets_return_to_zero() {
    let factory = serverbound();
    let bytes = factory
        .encode(&Packet::PlayKeepAliveServerbound(KeepAlive { id: 1 }))
        .unwrap();
    let mut held = Vec::new();
    for _ in 0..10 {
        held.push(expect_packet(
            factory
                .create_packet_from_slice(ProtocolState::Play, &bytes)
                .unwrap(),
        ));
    }
    assert_eq!(factory.live_packets(), 10);
    let first = held.remove(0);
    factory.free_packet(first);
    assert_eq!(factory.live_packets(), 9);
    drop(held);
    assert_eq!(factory.live_packets(), 0);
}

#[derive(Debug, Default)]
struct Brand {
    name: String,
}

impl CustomPacket for Brand {
    fn name(&self) -> &'static str {
        "Brand"
    }
    fn state(&self) -> ProtocolState {
        ProtocolState::Play
    }
    fn direction(&self) -> Direction {
        Direction::Clientbound
    }
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.name = buf.read_string(64)?;
        Ok(())
    }
    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.name);
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn duplicate_rejected_and_replace_overrides() {
    let adapter = V1_21Adapter::new();
    let mut builder = PacketRegistry::builder(adapter.protocol_version(), Direction::Clientbound);
    adapter
        .register_packets(Direction::Clientbound, &mut builder)
        .unwrap();

    let err = builder
        .register(ProtocolState::Play, 0x26, "Brand", || {
            Packet::Custom(Box::new(Brand::default()))
        })
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::DuplicateRegistration {
            state: ProtocolState::Play,
            id: 0x26,
            existing: "PlayKeepAliveClientbound",
            attempted: "Brand",
        }
    );

    builder.replace(ProtocolState::Play, 0x26, "Brand", || {
        Packet::Custom(Box::new(Brand::default()))
    });
    let factory = PacketFactory::new(Arc::new(builder.build()));

    let mut data = BytesMut::new();
    write_varint(&mut data, 0x26);
    write_string(&mut data, "vanilla");
    let decoded = expect_packet(
        factory
            .create_packet_from_slice(ProtocolState::Play, &data)
            .unwrap(),
    );
    assert_eq!(decoded.packet().downcast_custom::<Brand>().unwrap().name, "vanilla");
    assert_eq!(
        factory.encode(decoded.packet()).unwrap().to_vec(),
        data.to_vec()
    );
}

#[test]
fn decode_framed_stream() {
    let factory = clientbound();
    let packets = [
        Packet::SetCompression(SetCompression { threshold: 256 }),
        Packet::LoginPluginRequest(LoginPluginRequest {
            message_id: 1,
            channel: Identifier::new("velocity", "player_info"),
            data: vec![4],
        }),
    ];
    let mut stream = BytesMut::new();
    for packet in &packets {
        stream.put_slice(&factory.encode_frame(packet).unwrap());
    }
    let mut buf = DataBuffer::new(&stream);
    let mut names = Vec::new();
    while buf.has_remaining() {
        let packet = expect_packet(factory.decode_frame(ProtocolState::Login, &mut buf).unwrap());
        names.push(packet.name());
    }
    assert_eq!(names, vec!["SetCompression", "LoginPluginRequest"]);
}
