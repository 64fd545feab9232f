use crate::{BlockEntityError, BlockEntityResult};
use trowel_nbt::NbtValue;
use trowel_types::{BlockPos, Identifier};

/// Block entity types this crate knows how to model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockEntityType {
    Dropper,
    Dispenser,
    Chest,
    Hopper,
}

impl BlockEntityType {
    pub const ALL: [BlockEntityType; 4] = [
        BlockEntityType::Dropper,
        BlockEntityType::Dispenser,
        BlockEntityType::Chest,
        BlockEntityType::Hopper,
    ];

    /// Registry path under the `minecraft` namespace.
    pub fn path(self) -> &'static str {
        match self {
            BlockEntityType::Dropper => "dropper",
            BlockEntityType::Dispenser => "dispenser",
            BlockEntityType::Chest => "chest",
            BlockEntityType::Hopper => "hopper",
        }
    }

    pub fn identifier(self) -> Identifier {
        Identifier::minecraft(self.path())
    }

    /// Parse an `id` tag. Bare paths are taken to be in `minecraft`.
    pub fn from_id(id: &str) -> Option<Self> {
        let path = match id.split_once(':') {
            Some(("minecraft", path)) => path,
            Some(_) => return None,
            None => id,
        };
        Self::ALL.into_iter().find(|kind| kind.path() == path)
    }

    /// Numeric id in the `block_entity_type` registry for protocol 767.
    pub fn protocol_id(self) -> i32 {
        match self {
            BlockEntityType::Chest => 1,
            BlockEntityType::Dispenser => 5,
            BlockEntityType::Dropper => 6,
            BlockEntityType::Hopper => 17,
        }
    }

    pub fn from_protocol_id(id: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.protocol_id() == id)
    }

    /// Number of inventory slots.
    pub fn inventory_size(self) -> usize {
        match self {
            BlockEntityType::Dropper | BlockEntityType::Dispenser => 9,
            BlockEntityType::Chest => 27,
            BlockEntityType::Hopper => 5,
        }
    }
}

impl std::fmt::Display for BlockEntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "minecraft:{}", self.path())
    }
}

/// State shared by every block entity: its type and where it sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEntityBase {
    pub kind: BlockEntityType,
    pub position: BlockPos,
}

impl BlockEntityBase {
    pub fn new(kind: BlockEntityType, position: BlockPos) -> Self {
        Self { kind, position }
    }

    /// Picks up `x`/`y`/`z` when present. Packet-carried NBT omits them,
    /// in which case the position from the packet is kept.
    pub fn import_nbt(&mut self, nbt: &NbtValue) -> BlockEntityResult<()> {
        ensure_compound(nbt)?;
        if let (Some(x), Some(y), Some(z)) = (
            nbt.get("x").and_then(|v| v.as_int()),
            nbt.get("y").and_then(|v| v.as_int()),
            nbt.get("z").and_then(|v| v.as_int()),
        ) {
            self.position = BlockPos::new(x, y, z);
        }
        if let Some(id) = nbt.get("id").and_then(|v| v.as_str()) {
            match BlockEntityType::from_id(id) {
                Some(kind) if kind == self.kind => {}
                _ => return Err(BlockEntityError::UnknownType(id.to_string())),
            }
        }
        Ok(())
    }
}

/// Anything that lives at a block position.
pub trait BlockEntity {
    fn base(&self) -> &BlockEntityBase;

    fn base_mut(&mut self) -> &mut BlockEntityBase;

    /// Load state from NBT. Tags that are absent leave the current
    /// value untouched.
    fn import_nbt(&mut self, nbt: &NbtValue) -> BlockEntityResult<()>;

    fn kind(&self) -> BlockEntityType {
        self.base().kind
    }

    fn position(&self) -> BlockPos {
        self.base().position
    }
}

pub(crate) fn ensure_compound(nbt: &NbtValue) -> BlockEntityResult<()> {
    match nbt {
        NbtValue::Compound(_) => Ok(()),
        other => Err(BlockEntityError::TypeMismatch {
            expected: "compound",
            found: tag_name(other).to_string(),
        }),
    }
}

pub(crate) fn tag_name(nbt: &NbtValue) -> &'static str {
    match nbt {
        NbtValue::Byte(_) => "byte",
        NbtValue::Short(_) => "short",
        NbtValue::Int(_) => "int",
        NbtValue::Long(_) => "long",
        NbtValue::Float(_) => "float",
        NbtValue::Double(_) => "double",
        NbtValue::ByteArray(_) => "byte array",
        NbtValue::String(_) => "string",
        NbtValue::List(_) => "list",
        NbtValue::Compound(_) => "compound",
        NbtValue::IntArray(_) => "int array",
        NbtValue::LongArray(_) => "long array",
    }
}
