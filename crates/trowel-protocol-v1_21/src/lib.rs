//! Protocol 767 (Minecraft 1.21 and 1.21.1).

mod adapter;

pub use adapter::*;
