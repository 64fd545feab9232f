pub mod adapter;
pub mod buffer;
pub mod codec;
pub mod error;
pub mod factory;
pub mod limits;
pub mod packet;
pub mod packets;
pub mod registry;
pub mod state;

pub use adapter::*;
pub use buffer::*;
pub use codec::*;
pub use error::*;
pub use factory::*;
pub use limits::*;
pub use packet::*;
pub use packets::*;
pub use registry::*;
pub use state::*;
