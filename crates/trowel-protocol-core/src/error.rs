use crate::ProtocolState;
use thiserror::Error;
use trowel_nbt::NbtError;

/// Why a single message failed to decode. Always local to that message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Out of bounds: requested {requested} bytes, {remaining} remaining")]
    OutOfBounds { requested: usize, remaining: usize },
    #[error("VarInt too big")]
    VarIntTooBig,
    #[error("VarLong too big")]
    VarLongTooBig,
    #[error("Negative length prefix: {0}")]
    NegativeLength(i32),
    #[error("String too long: {len} > {max}")]
    StringTooLong { len: usize, max: usize },
    #[error("Byte array too long: {len} > {max}")]
    ByteArrayTooLong { len: usize, max: usize },
    #[error("Array too long: {len} > {max}")]
    ArrayTooLong { len: usize, max: usize },
    #[error("Packet too long: {len} > {max}")]
    PacketTooLong { len: usize, max: usize },
    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: i64 },
    #[error("Slot carries {0} data components, which are not decoded")]
    UnsupportedComponents(i32),
    #[error("NBT error: {0}")]
    Nbt(#[from] NbtError),
    #[error("Malformed packet header: {0}")]
    MalformedHeader(Box<DecodeError>),
    #[error(
        "Packet {id:#04x} in {state:?} consumed {consumed} bytes, declared {declared}"
    )]
    TrailingOrMissingData {
        state: ProtocolState,
        id: i32,
        declared: usize,
        consumed: usize,
    },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Packet id {id:#04x} in {state:?} already bound to {existing}, refusing {attempted}")]
    DuplicateRegistration {
        state: ProtocolState,
        id: i32,
        existing: &'static str,
        attempted: &'static str,
    },
    #[error("{name} belongs to {expected:?}, cannot register it in {actual:?}")]
    StateMismatch {
        name: &'static str,
        expected: ProtocolState,
        actual: ProtocolState,
    },
    #[error("{name} is not a {expected:?} packet")]
    DirectionMismatch {
        name: &'static str,
        expected: crate::Direction,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{name} has no id registered in {state:?}")]
    Unregistered {
        state: ProtocolState,
        name: &'static str,
    },
}
