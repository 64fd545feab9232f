use crate::codec::*;
use crate::packets::common::{read_json_string, read_short_string, read_trailing_bytes};
use crate::{DataBuffer, DecodeResult, PacketBody};
use bytes::{BufMut, BytesMut};
use trowel_types::{GameProfile, Identifier, ProfileProperty, TextComponent};
use uuid::Uuid;

const MAX_USERNAME: usize = 16;
const MAX_CRYPTO_BYTES: usize = 4096;

// === Serverbound ===

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginStart {
    pub name: String,
    pub uuid: Uuid,
}

impl PacketBody for LoginStart {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.name = buf.read_string(MAX_USERNAME)?;
        self.uuid = buf.read_uuid()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.name);
        write_uuid(buf, &self.uuid);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionResponse {
    pub shared_secret: Vec<u8>,
    pub verify_token: Vec<u8>,
}

impl PacketBody for EncryptionResponse {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.shared_secret = buf.read_byte_array(MAX_CRYPTO_BYTES)?;
        self.verify_token = buf.read_byte_array(MAX_CRYPTO_BYTES)?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_byte_array(buf, &self.shared_secret);
        write_byte_array(buf, &self.verify_token);
    }
}

/// Reply to a login plugin request. `data` is `None` when the client did
/// not understand the channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPluginResponse {
    pub message_id: i32,
    pub data: Option<Vec<u8>>,
}

impl PacketBody for LoginPluginResponse {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.message_id = buf.read_varint()?;
        self.data = if buf.read_bool()? {
            Some(read_trailing_bytes(buf)?)
        } else {
            None
        };
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.message_id);
        match &self.data {
            Some(data) => {
                write_bool(buf, true);
                buf.put_slice(data);
            }
            None => write_bool(buf, false),
        }
    }
}

// === Clientbound ===

/// Login-state disconnect; the reason is JSON chat text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginDisconnect {
    pub reason: String,
}

impl LoginDisconnect {
    pub fn reason_text(&self) -> Option<TextComponent> {
        TextComponent::from_json(&self.reason).ok()
    }
}

impl PacketBody for LoginDisconnect {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.reason = read_json_string(buf)?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.reason);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionRequest {
    pub server_id: String,
    pub public_key: Vec<u8>,
    pub verify_token: Vec<u8>,
    pub should_authenticate: bool,
}

impl PacketBody for EncryptionRequest {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.server_id = buf.read_string(20)?;
        self.public_key = buf.read_byte_array(MAX_CRYPTO_BYTES)?;
        self.verify_token = buf.read_byte_array(MAX_CRYPTO_BYTES)?;
        self.should_authenticate = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.server_id);
        write_byte_array(buf, &self.public_key);
        write_byte_array(buf, &self.verify_token);
        write_bool(buf, self.should_authenticate);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginSuccess {
    pub profile: GameProfile,
    pub strict_error_handling: bool,
}

impl PacketBody for LoginSuccess {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.profile.uuid = buf.read_uuid()?;
        self.profile.name = buf.read_string(MAX_USERNAME)?;
        self.profile.properties = buf.read_array(read_profile_property)?;
        self.strict_error_handling = buf.read_bool()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_uuid(buf, &self.profile.uuid);
        write_string(buf, &self.profile.name);
        write_varint(buf, self.profile.properties.len() as i32);
        for prop in &self.profile.properties {
            write_profile_property(buf, prop);
        }
        write_bool(buf, self.strict_error_handling);
    }
}

pub(crate) fn read_profile_property(buf: &mut DataBuffer<'_>) -> DecodeResult<ProfileProperty> {
    Ok(ProfileProperty {
        name: buf.read_string(64)?,
        value: read_short_string(buf)?,
        signature: buf.read_option(|buf| buf.read_string(1024))?,
    })
}

pub(crate) fn write_profile_property(buf: &mut BytesMut, prop: &ProfileProperty) {
    write_string(buf, &prop.name);
    write_string(buf, &prop.value);
    match &prop.signature {
        Some(sig) => {
            write_bool(buf, true);
            write_string(buf, sig);
        }
        None => write_bool(buf, false),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetCompression {
    pub threshold: i32,
}

impl PacketBody for SetCompression {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.threshold = buf.read_varint()?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.threshold);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginPluginRequest {
    pub message_id: i32,
    pub channel: Identifier,
    pub data: Vec<u8>,
}

impl PacketBody for LoginPluginRequest {
    fn decode(&mut self, buf: &mut DataBuffer<'_>) -> DecodeResult<()> {
        self.message_id = buf.read_varint()?;
        self.channel = buf.read_identifier()?;
        self.data = read_trailing_bytes(buf)?;
        Ok(())
    }

    fn encode(&self, buf: &mut BytesMut) {
        write_varint(buf, self.message_id);
        write_identifier(buf, &self.channel);
        buf.put_slice(&self.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_success_with_properties() {
        let original = LoginSuccess {
            profile: GameProfile {
                uuid: Uuid::new_v4(),
                name: "Notch".into(),
                properties: vec![
                    ProfileProperty {
                        name: "textures".into(),
                        value: "e30=".into(),
                        signature: Some("c2ln".into()),
                    },
                    ProfileProperty {
                        name: "extra".into(),
                        value: "x".into(),
                        signature: None,
                    },
                ],
            },
            strict_error_handling: true,
        };
        let mut out = BytesMut::new();
        original.encode(&mut out);
        let mut buf = DataBuffer::new(&out);
        let mut decoded = LoginSuccess::default();
        decoded.decode(&mut buf).unwrap();
        assert_eq!(decoded, original);
        assert!(!buf.has_remaining());
    }

    #[test]
    fn test_username_limit() {
        let mut out = BytesMut::new();
        LoginStart {
            name: "a_name_that_is_too_long".into(),
            uuid: Uuid::nil(),
        }
        .encode(&mut out);
        let mut decoded = LoginStart::default();
        assert!(decoded.decode(&mut DataBuffer::new(&out)).is_err());
    }

    #[test]
    fn test_disconnect_reason_text() {
        let packet = LoginDisconnect {
            reason: r#"{"text":"Server full"}"#.into(),
        };
        assert_eq!(packet.reason_text().unwrap().text, "Server full");
    }
}
