use crate::codec::*;
use crate::{DataBuffer, DecodeResult, PacketBody, ProtocolState};
use bytes::{BufMut, BytesMut};

/// Maximum server address length.
const MAX_SERVER_ADDRESS: usize = 255;

/// First packet of every connection; selects status or login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handshake {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    /// Raw intent: 1 = status, 2 = login, 3 = transfer.
    pub next_state: i32,
}

impl Handshake {
    /// The state the connection moves to, if `next_state` is valid.
    pub fn target_state(&self) -> Option<ProtocolState> {
        ProtocolState::from_handshake_next(self.next_state)
    }
}

impl PacketBody for Handshake {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.protocol_version = buf.read_varint()?;
        self.server_address = buf.read_string(MAX_SERVER_ADDRESS)?;
        self.server_port = buf.read_u16()?;
        self.next_state = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.protocol_version);
        write_string(buf, &self.server_address);
        buf.put_u16(self.server_port);
        write_varint(buf, self.next_state);
    }
}
