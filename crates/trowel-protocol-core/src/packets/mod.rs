//! Packet bodies, grouped by protocol state. Shapes shared by several
//! states (keep-alives, plugin messages, client settings) live in `common`.

mod common;
mod configuration;
mod handshake;
mod login;
mod play_clientbound;
mod play_serverbound;
mod status;

pub use common::*;
pub use configuration::*;
pub use handshake::*;
pub use login::*;
pub use play_clientbound::*;
pub use play_serverbound::*;
pub use status::*;
