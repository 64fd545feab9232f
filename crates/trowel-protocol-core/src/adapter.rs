use crate::{DecodeLimits, Direction, PacketFactory, PacketRegistry, PacketRegistryBuilder, RegistryError};
use std::sync::Arc;

/// Trait for version-specific protocol adapters.
/// Each supported protocol version fills a registry with its packet ids.
pub trait ProtocolAdapter: Send + Sync {
    /// The protocol version number this adapter handles.
    fn protocol_version(&self) -> i32;

    /// Register every packet this version sends in `direction`.
    fn register_packets(
        &self,
        direction: Direction,
        builder: &mut PacketRegistryBuilder,
    ) -> Result<(), RegistryError>;

    /// A complete registry for one direction.
    fn registry(&self, direction: Direction) -> Result<PacketRegistry, RegistryError> {
        let mut builder = PacketRegistry::builder(self.protocol_version(), direction);
        self.register_packets(direction, &mut builder)?;
        Ok(builder.build())
    }

    /// A factory decoding packets travelling in `direction`.
    fn factory(
        &self,
        direction: Direction,
        limits: DecodeLimits,
    ) -> Result<PacketFactory, RegistryError> {
        Ok(PacketFactory::with_limits(
            Arc::new(self.registry(direction)?),
            limits,
        ))
    }
}
