use crate::codec::*;
use crate::packets::common::read_short_string;
use crate::{DataBuffer, DecodeResult, PacketBody};
use bytes::BytesMut;
use trowel_nbt::NbtValue;
use trowel_types::Identifier;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownPack {
    pub namespace: String,
    pub id: String,
    pub version: String,
}

/// Known-packs exchange; the same shape travels in both directions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownPacks {
    pub packs: Vec<KnownPack>,
}

impl PacketBody for KnownPacks {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.packs = buf.read_array(|buf| {
            Ok(KnownPack {
                namespace: read_short_string(buf)?,
                id: read_short_string(buf)?,
                version: read_short_string(buf)?,
            })
        })?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.packs.len() as i32);
        for pack in &self.packs {
            write_string(buf, &pack.namespace);
            write_string(buf, &pack.id);
            write_string(buf, &pack.version);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryDataEntry {
    pub id: Identifier,
    /// `None` when the client is expected to use its known-pack copy.
    pub data: Option<NbtValue>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryData {
    pub registry_id: Identifier,
    pub entries: Vec<RegistryDataEntry>,
}

impl PacketBody for RegistryData {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.registry_id = buf.read_identifier()?;
        self.entries = buf.read_array(|buf| {
            Ok(RegistryDataEntry {
                id: buf.read_identifier()?,
                data: buf.read_option(|buf| buf.read_nbt())?,
            })
        })?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_identifier(buf, &self.registry_id);
        write_varint(buf, self.entries.len() as i32);
        for entry in &self.entries {
            write_identifier(buf, &entry.id);
            match &entry.data {
                Some(nbt) => {
                    write_bool(buf, true);
                    write_nbt(buf, nbt);
                }
                None => write_bool(buf, false),
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub flags: Vec<Identifier>,
}

impl PacketBody for FeatureFlags {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.flags = buf.read_array(|buf| buf.read_identifier())?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.flags.len() as i32);
        for flag in &self.flags {
            write_identifier(buf, flag);
        }
    }
}
