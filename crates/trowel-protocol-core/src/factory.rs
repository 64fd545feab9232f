use crate::codec::write_varint;
use crate::{
    DataBuffer, DecodeError, DecodeLimits, DecodeResult, EncodeError, Packet, PacketRegistry,
    ProtocolState,
};
use bytes::BytesMut;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of decoding one message.
#[derive(Debug)]
pub enum Decoded {
    Packet(OwnedPacket),
    /// The id has no registry entry in this state. Not an error: the caller
    /// decides whether to skip it or drop the connection.
    Unrecognized(UnrecognizedPacket),
}

/// A message whose id is not registered. The outer cursor has not moved;
/// skip `length` bytes to reach the next message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedPacket {
    pub state: ProtocolState,
    pub id: i32,
    /// Declared length, id included.
    pub length: usize,
    /// Bytes after the id.
    pub payload: Vec<u8>,
}

/// Single-owner handle to a decoded packet. Dropping it releases the packet
/// and updates the factory's live count.
pub struct OwnedPacket {
    packet: Box<Packet>,
    id: i32,
    state: ProtocolState,
    _live: LiveGuard,
}

/// One unit of a factory's live count, given back on drop.
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn acquire(live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::Relaxed);
        Self(live)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl OwnedPacket {
    fn new(packet: Packet, id: i32, state: ProtocolState, live: Arc<AtomicUsize>) -> Self {
        Self {
            packet: Box::new(packet),
            id,
            state,
            _live: LiveGuard::acquire(live),
        }
    }

    /// The wire id this packet was decoded under.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// The state the caller supplied when decoding.
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Take the packet out, releasing the handle.
    pub fn into_inner(self) -> Packet {
        *self.packet
    }
}

impl Deref for OwnedPacket {
    type Target = Packet;

    fn deref(&self) -> &Packet {
        &self.packet
    }
}

impl fmt::Debug for OwnedPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedPacket")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("packet", &self.packet)
            .finish()
    }
}

/// Turns `(state, bytes)` into packets using one registry.
#[derive(Clone)]
pub struct PacketFactory {
    registry: Arc<PacketRegistry>,
    limits: DecodeLimits,
    live: Arc<AtomicUsize>,
}

impl PacketFactory {
    pub fn new(registry: Arc<PacketRegistry>) -> Self {
        Self::with_limits(registry, DecodeLimits::default())
    }

    pub fn with_limits(registry: Arc<PacketRegistry>, limits: DecodeLimits) -> Self {
        Self {
            registry,
            limits,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn registry(&self) -> &Arc<PacketRegistry> {
        &self.registry
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Decode the message of `length` bytes at the cursor: a varint id
    /// followed by the packet body.
    ///
    /// On success the cursor has advanced by exactly `length`. On error, or
    /// when the id is unrecognized, the cursor is where it was.
    pub fn create_packet(
        &self,
        state: ProtocolState,
        buf: &mut DataBuffer<'_>,
        length: usize,
    ) -> DecodeResult<Decoded> {
        if length > buf.remaining() {
            return Err(DecodeError::OutOfBounds {
                requested: length,
                remaining: buf.remaining(),
            });
        }
        if length > self.limits.max_packet_len {
            return Err(DecodeError::PacketTooLong {
                len: length,
                max: self.limits.max_packet_len,
            });
        }

        let body = &buf.peek_remaining()[..length];
        let mut frame = DataBuffer::with_limits(body, self.limits);
        let id = frame
            .read_varint()
            .map_err(|e| DecodeError::MalformedHeader(Box::new(e)))?;

        let Some(entry) = self.registry.lookup(state, id) else {
            debug!("Unrecognized packet {:#04x} in {:?} ({} bytes)", id, state, length);
            return Ok(Decoded::Unrecognized(UnrecognizedPacket {
                state,
                id,
                length,
                payload: frame.read_remaining().to_vec(),
            }));
        };

        let mut packet = entry.construct();
        match packet.decode(&mut frame) {
            Ok(()) => {}
            Err(DecodeError::OutOfBounds {
                requested,
                remaining,
            }) => {
                // Inner transactions may have rewound the frame; the shortfall
                // at the failing read is what ran past the end.
                return Err(DecodeError::TrailingOrMissingData {
                    state,
                    id,
                    declared: length,
                    consumed: length + requested.saturating_sub(remaining),
                });
            }
            Err(e) => return Err(e),
        }
        if frame.has_remaining() {
            return Err(DecodeError::TrailingOrMissingData {
                state,
                id,
                declared: length,
                consumed: frame.offset(),
            });
        }

        buf.skip(length)?;
        trace!("Decoded {} ({:#04x}) in {:?}", packet.name(), id, state);
        Ok(Decoded::Packet(OwnedPacket::new(
            packet,
            id,
            state,
            Arc::clone(&self.live),
        )))
    }

    /// Decode a whole message held in `data`.
    pub fn create_packet_from_slice(
        &self,
        state: ProtocolState,
        data: &[u8],
    ) -> DecodeResult<Decoded> {
        let mut buf = DataBuffer::with_limits(data, self.limits);
        self.create_packet(state, &mut buf, data.len())
    }

    /// Read a varint length prefix, then the message it frames. The cursor
    /// is left untouched on error; for an unrecognized packet it is placed
    /// after the length prefix.
    pub fn decode_frame(
        &self,
        state: ProtocolState,
        buf: &mut DataBuffer<'_>,
    ) -> DecodeResult<Decoded> {
        buf.transaction(|buf| {
            let length = buf.read_varint()?;
            if length < 0 {
                return Err(DecodeError::NegativeLength(length));
            }
            self.create_packet(state, buf, length as usize)
        })
    }

    /// Explicit release. Equivalent to dropping the handle.
    pub fn free_packet(&self, packet: OwnedPacket) {
        trace!("Released {} ({:#04x})", packet.name(), packet.id());
        drop(packet);
    }

    /// Handles created by this factory (or its clones) not yet released.
    pub fn live_packets(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Encode `packet` as its registered id followed by its body.
    pub fn encode(&self, packet: &Packet) -> Result<BytesMut, EncodeError> {
        let id = self
            .registry
            .id_of(packet)
            .ok_or(EncodeError::Unregistered {
                state: packet.state(),
                name: packet.name(),
            })?;
        let mut buf = BytesMut::new();
        write_varint(&mut buf, id);
        packet.encode(&mut buf);
        Ok(buf)
    }

    /// Encode with a varint length prefix, the uncompressed frame layout.
    pub fn encode_frame(&self, packet: &Packet) -> Result<BytesMut, EncodeError> {
        let body = self.encode(packet)?;
        let mut frame = BytesMut::with_capacity(body.len() + 5);
        write_varint(&mut frame, body.len() as i32);
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

impl fmt::Debug for PacketFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketFactory")
            .field("registry", &self.registry)
            .field("limits", &self.limits)
            .field("live", &self.live_packets())
            .finish()
    }
}
