mod nbt;

pub use nbt::*;
