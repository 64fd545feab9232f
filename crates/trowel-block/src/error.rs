use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockEntityError {
    #[error("Missing block entity id")]
    MissingId,
    #[error("Unknown block entity type {0:?}")]
    UnknownType(String),
    #[error("Expected {expected} NBT, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("Inventory slot {slot} out of range (size {size})")]
    SlotOutOfRange { slot: i64, size: usize },
    #[error("{field} {value} does not fit in an int")]
    ValueOutOfRange { field: &'static str, value: i64 },
    #[error("Bad item id {0:?}")]
    BadItemId(String),
}

pub type BlockEntityResult<T> = Result<T, BlockEntityError>;
