//! Block entities that carry inventories and custom names, built from
//! NBT handed over by block entity packets.

mod container;
mod entity;
mod error;
mod inventory;
mod nameable;

pub use container::*;
pub use entity::*;
pub use error::*;
pub use inventory::*;
pub use nameable::*;
