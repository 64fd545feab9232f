use crate::packets::common::read_short_string;
use crate::codec::*;
use crate::{DataBuffer, DecodeResult, PacketBody};
use bytes::{BufMut, BytesMut};

/// Server list response: the status JSON (MOTD, players, version).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusResponse {
    pub json: String,
}

impl PacketBody for StatusResponse {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.json = read_short_string(buf)?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.json);
    }
}

/// Status ping and pong share one shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ping {
    pub payload: i64,
}

impl PacketBody for Ping {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.payload = buf.read_i64()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i64(self.payload);
    }
}
