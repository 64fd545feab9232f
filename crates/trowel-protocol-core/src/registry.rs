use crate::{Direction, Packet, PacketKind, ProtocolState, RegistryError};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Builds an empty packet ready to be decoded into.
pub type Constructor = Arc<dyn Fn() -> Packet + Send + Sync>;

/// What a `(state, id)` key resolves to.
#[derive(Clone)]
pub struct RegistryEntry {
    pub name: &'static str,
    /// `None` for custom packets.
    pub kind: Option<PacketKind>,
    constructor: Constructor,
}

impl RegistryEntry {
    /// A fresh, empty packet of this entry's kind.
    pub fn construct(&self) -> Packet {
        (self.constructor)()
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Mutable registration phase. Turned into an immutable
/// [`PacketRegistry`] by [`build`](Self::build).
pub struct PacketRegistryBuilder {
    protocol_version: i32,
    direction: Direction,
    entries: BTreeMap<(ProtocolState, i32), RegistryEntry>,
}

impl PacketRegistryBuilder {
    pub fn new(protocol_version: i32, direction: Direction) -> Self {
        Self {
            protocol_version,
            direction,
            entries: BTreeMap::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    /// Bind `(state, id)` to a constructor. Fails if the key is taken.
    pub fn register<F>(
        &mut self,
        state: ProtocolState,
        id: i32,
        name: &'static str,
        constructor: F,
    ) -> Result<&mut Self, RegistryError>
    where
        F: Fn() -> Packet + Send + Sync + 'static,
    {
        self.insert(state, id, name, None, Arc::new(constructor))?;
        Ok(self)
    }

    /// Bind a built-in kind to an id in its own state. The kind's direction
    /// must match the registry's.
    pub fn register_kind(&mut self, kind: PacketKind, id: i32) -> Result<&mut Self, RegistryError> {
        self.check_direction(kind)?;
        self.insert(kind.state(), id, kind.name(), Some(kind), kind_constructor(kind))?;
        Ok(self)
    }

    /// Like [`register_kind`](Self::register_kind), for callers that carry
    /// the state separately; a kind from another state is rejected.
    pub fn register_kind_in(
        &mut self,
        state: ProtocolState,
        kind: PacketKind,
        id: i32,
    ) -> Result<&mut Self, RegistryError> {
        if kind.state() != state {
            return Err(RegistryError::StateMismatch {
                name: kind.name(),
                expected: kind.state(),
                actual: state,
            });
        }
        self.register_kind(kind, id)
    }

    /// Bind `(state, id)` unconditionally, overriding any earlier entry.
    pub fn replace<F>(
        &mut self,
        state: ProtocolState,
        id: i32,
        name: &'static str,
        constructor: F,
    ) -> &mut Self
    where
        F: Fn() -> Packet + Send + Sync + 'static,
    {
        let entry = RegistryEntry {
            name,
            kind: None,
            constructor: Arc::new(constructor),
        };
        if let Some(old) = self.entries.insert((state, id), entry) {
            tracing::warn!(
                "Replaced packet {:#04x} in {:?}: {} -> {}",
                id,
                state,
                old.name,
                name
            );
        }
        self
    }

    /// Same as [`replace`](Self::replace) for a built-in kind, which also
    /// drops whatever other id the kind was bound to, so the kind moves.
    pub fn replace_kind(&mut self, kind: PacketKind, id: i32) -> Result<&mut Self, RegistryError> {
        self.check_direction(kind)?;
        let state = kind.state();
        self.entries.retain(|&(s, old_id), entry| {
            let stale = s == state && old_id != id && entry.kind == Some(kind);
            if stale {
                tracing::debug!(
                    "Moved {} in {:?}: {:#04x} -> {:#04x}",
                    kind.name(),
                    state,
                    old_id,
                    id
                );
            }
            !stale
        });
        let entry = RegistryEntry {
            name: kind.name(),
            kind: Some(kind),
            constructor: kind_constructor(kind),
        };
        if let Some(old) = self.entries.insert((state, id), entry) {
            tracing::warn!(
                "Replaced packet {:#04x} in {:?}: {} -> {}",
                id,
                state,
                old.name,
                kind.name()
            );
        }
        Ok(self)
    }

    pub fn build(self) -> PacketRegistry {
        let mut ids_by_name = HashMap::with_capacity(self.entries.len());
        for (&(state, id), entry) in &self.entries {
            // Lowest id wins when a name is bound twice in one state.
            ids_by_name.entry((state, entry.name)).or_insert(id);
        }
        tracing::debug!(
            "Built {:?} registry for protocol {} with {} packets",
            self.direction,
            self.protocol_version,
            self.entries.len()
        );
        PacketRegistry {
            protocol_version: self.protocol_version,
            direction: self.direction,
            entries: self.entries,
            ids_by_name,
        }
    }

    fn check_direction(&self, kind: PacketKind) -> Result<(), RegistryError> {
        if kind.direction() != self.direction {
            return Err(RegistryError::DirectionMismatch {
                name: kind.name(),
                expected: self.direction,
            });
        }
        Ok(())
    }

    fn insert(
        &mut self,
        state: ProtocolState,
        id: i32,
        name: &'static str,
        kind: Option<PacketKind>,
        constructor: Constructor,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.entries.get(&(state, id)) {
            return Err(RegistryError::DuplicateRegistration {
                state,
                id,
                existing: existing.name,
                attempted: name,
            });
        }
        self.entries.insert(
            (state, id),
            RegistryEntry {
                name,
                kind,
                constructor,
            },
        );
        Ok(())
    }
}

impl fmt::Debug for PacketRegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketRegistryBuilder")
            .field("protocol_version", &self.protocol_version)
            .field("direction", &self.direction)
            .field("entries", &self.entries.len())
            .finish()
    }
}

fn kind_constructor(kind: PacketKind) -> Constructor {
    Arc::new(move || kind.empty())
}

/// Immutable `(state, id) -> constructor` table for one protocol version and
/// one direction.
pub struct PacketRegistry {
    protocol_version: i32,
    direction: Direction,
    entries: BTreeMap<(ProtocolState, i32), RegistryEntry>,
    ids_by_name: HashMap<(ProtocolState, &'static str), i32>,
}

impl PacketRegistry {
    pub fn builder(protocol_version: i32, direction: Direction) -> PacketRegistryBuilder {
        PacketRegistryBuilder::new(protocol_version, direction)
    }

    pub fn protocol_version(&self) -> i32 {
        self.protocol_version
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn lookup(&self, state: ProtocolState, id: i32) -> Option<&RegistryEntry> {
        self.entries.get(&(state, id))
    }

    pub fn contains(&self, state: ProtocolState, id: i32) -> bool {
        self.entries.contains_key(&(state, id))
    }

    /// The wire id this registry uses for `packet`.
    pub fn id_of(&self, packet: &Packet) -> Option<i32> {
        self.id_of_name(packet.state(), packet.name())
    }

    pub fn id_of_kind(&self, kind: PacketKind) -> Option<i32> {
        self.id_of_name(kind.state(), kind.name())
    }

    pub fn id_of_name(&self, state: ProtocolState, name: &'static str) -> Option<i32> {
        self.ids_by_name.get(&(state, name)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in `(state, id)` order.
    pub fn iter(&self) -> impl Iterator<Item = (ProtocolState, i32, &RegistryEntry)> {
        self.entries
            .iter()
            .map(|(&(state, id), entry)| (state, id, entry))
    }

    pub fn ids_in(&self, state: ProtocolState) -> impl Iterator<Item = i32> + '_ {
        self.entries
            .range((state, i32::MIN)..=(state, i32::MAX))
            .map(|(&(_, id), _)| id)
    }
}

impl fmt::Debug for PacketRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketRegistry")
            .field("protocol_version", &self.protocol_version)
            .field("direction", &self.direction)
            .field("len", &self.entries.len())
            .finish()
    }
}
