use crate::entity::ensure_compound;
use crate::{
    BlockEntity, BlockEntityBase, BlockEntityError, BlockEntityResult, BlockEntityType, CustomName,
    Inventory, InventoryBlock, Nameable,
};
use tracing::trace;
use trowel_nbt::NbtValue;
use trowel_types::{BlockPos, TextComponent};

/// Defines a named, item-holding block entity. Each capability is its own
/// field and the traits forward to it.
macro_rules! container_block_entity {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub base: BlockEntityBase,
            pub inventory: Inventory,
            pub name: CustomName,
        }

        impl $name {
            pub const KIND: BlockEntityType = $kind;

            pub fn new(position: BlockPos) -> Self {
                Self {
                    base: BlockEntityBase::new(Self::KIND, position),
                    inventory: Inventory::new(Self::KIND.inventory_size()),
                    name: CustomName::default(),
                }
            }
        }

        impl BlockEntity for $name {
            fn base(&self) -> &BlockEntityBase {
                &self.base
            }

            fn base_mut(&mut self) -> &mut BlockEntityBase {
                &mut self.base
            }

            /// All or nothing: a bad tag leaves the entity untouched.
            fn import_nbt(&mut self, nbt: &NbtValue) -> BlockEntityResult<()> {
                let mut staged = self.clone();
                staged.base.import_nbt(nbt)?;
                staged.inventory.import_nbt(nbt)?;
                staged.name.import_nbt(nbt)?;
                *self = staged;
                trace!("Imported {} NBT at {}", Self::KIND, self.base.position);
                Ok(())
            }
        }

        impl InventoryBlock for $name {
            fn inventory(&self) -> &Inventory {
                &self.inventory
            }

            fn inventory_mut(&mut self) -> &mut Inventory {
                &mut self.inventory
            }
        }

        impl Nameable for $name {
            fn custom_name(&self) -> Option<&TextComponent> {
                self.name.get()
            }

            fn set_custom_name(&mut self, name: Option<TextComponent>) {
                self.name.set(name);
            }
        }
    };
}

container_block_entity!(
    /// Pushes items into the block it faces when powered.
    Dropper => BlockEntityType::Dropper
);

container_block_entity!(
    /// Fires or places its items when powered.
    Dispenser => BlockEntityType::Dispenser
);

container_block_entity!(
    /// Single chest, 27 slots.
    Chest => BlockEntityType::Chest
);

/// Five-slot item mover. Also tracks the ticks left until its next transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct Hopper {
    pub base: BlockEntityBase,
    pub inventory: Inventory,
    pub name: CustomName,
    pub transfer_cooldown: i32,
}

impl Hopper {
    pub const KIND: BlockEntityType = BlockEntityType::Hopper;

    pub fn new(position: BlockPos) -> Self {
        Self {
            base: BlockEntityBase::new(Self::KIND, position),
            inventory: Inventory::new(Self::KIND.inventory_size()),
            name: CustomName::default(),
            transfer_cooldown: -1,
        }
    }
}

impl BlockEntity for Hopper {
    fn base(&self) -> &BlockEntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BlockEntityBase {
        &mut self.base
    }

    fn import_nbt(&mut self, nbt: &NbtValue) -> BlockEntityResult<()> {
        let mut staged = self.clone();
        staged.base.import_nbt(nbt)?;
        staged.inventory.import_nbt(nbt)?;
        staged.name.import_nbt(nbt)?;
        if let Some(cooldown) = nbt.get("TransferCooldown").and_then(|v| v.as_integer()) {
            staged.transfer_cooldown =
                i32::try_from(cooldown).map_err(|_| BlockEntityError::ValueOutOfRange {
                    field: "TransferCooldown",
                    value: cooldown,
                })?;
        }
        *self = staged;
        Ok(())
    }
}

impl InventoryBlock for Hopper {
    fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}

impl Nameable for Hopper {
    fn custom_name(&self) -> Option<&TextComponent> {
        self.name.get()
    }

    fn set_custom_name(&mut self, name: Option<TextComponent>) {
        self.name.set(name);
    }
}

/// Any of the modelled block entities.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyBlockEntity {
    Dropper(Dropper),
    Dispenser(Dispenser),
    Chest(Chest),
    Hopper(Hopper),
}

impl AnyBlockEntity {
    /// An empty block entity of the given type.
    pub fn new(kind: BlockEntityType, position: BlockPos) -> Self {
        match kind {
            BlockEntityType::Dropper => AnyBlockEntity::Dropper(Dropper::new(position)),
            BlockEntityType::Dispenser => AnyBlockEntity::Dispenser(Dispenser::new(position)),
            BlockEntityType::Chest => AnyBlockEntity::Chest(Chest::new(position)),
            BlockEntityType::Hopper => AnyBlockEntity::Hopper(Hopper::new(position)),
        }
    }

    /// Build from saved NBT, which names its type in `id` and carries
    /// `x`/`y`/`z`.
    pub fn from_nbt(nbt: &NbtValue) -> BlockEntityResult<Self> {
        ensure_compound(nbt)?;
        let id = nbt
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or(BlockEntityError::MissingId)?;
        let kind = BlockEntityType::from_id(id)
            .ok_or_else(|| BlockEntityError::UnknownType(id.to_string()))?;
        let mut entity = Self::new(kind, BlockPos::new(0, 0, 0));
        entity.as_block_entity_mut().import_nbt(nbt)?;
        Ok(entity)
    }

    /// Build from a block entity packet: numeric type, position and the
    /// optional NBT body. `Ok(None)` for types this crate does not model.
    pub fn from_packet(
        type_id: i32,
        position: BlockPos,
        nbt: Option<&NbtValue>,
    ) -> BlockEntityResult<Option<Self>> {
        let Some(kind) = BlockEntityType::from_protocol_id(type_id) else {
            return Ok(None);
        };
        let mut entity = Self::new(kind, position);
        if let Some(nbt) = nbt {
            entity.as_block_entity_mut().import_nbt(nbt)?;
        }
        Ok(Some(entity))
    }

    pub fn as_block_entity(&self) -> &dyn BlockEntity {
        match self {
            AnyBlockEntity::Dropper(e) => e,
            AnyBlockEntity::Dispenser(e) => e,
            AnyBlockEntity::Chest(e) => e,
            AnyBlockEntity::Hopper(e) => e,
        }
    }

    pub fn as_block_entity_mut(&mut self) -> &mut dyn BlockEntity {
        match self {
            AnyBlockEntity::Dropper(e) => e,
            AnyBlockEntity::Dispenser(e) => e,
            AnyBlockEntity::Chest(e) => e,
            AnyBlockEntity::Hopper(e) => e,
        }
    }

    pub fn as_inventory(&self) -> &dyn InventoryBlock {
        match self {
            AnyBlockEntity::Dropper(e) => e,
            AnyBlockEntity::Dispenser(e) => e,
            AnyBlockEntity::Chest(e) => e,
            AnyBlockEntity::Hopper(e) => e,
        }
    }

    pub fn as_nameable(&self) -> &dyn Nameable {
        match self {
            AnyBlockEntity::Dropper(e) => e,
            AnyBlockEntity::Dispenser(e) => e,
            AnyBlockEntity::Chest(e) => e,
            AnyBlockEntity::Hopper(e) => e,
        }
    }

    pub fn kind(&self) -> BlockEntityType {
        self.as_block_entity().kind()
    }

    pub fn position(&self) -> BlockPos {
        self.as_block_entity().position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoredItem;
    use trowel_nbt::{nbt_compound, nbt_list};
    use trowel_types::Identifier;

    fn dropper_nbt() -> NbtValue {
        nbt_compound! {
            "id" => NbtValue::String("minecraft:dropper".into()),
            "x" => NbtValue::Int(-12),
            "y" => NbtValue::Int(64),
            "z" => NbtValue::Int(300),
            "CustomName" => NbtValue::String(r#"{"text":"Sorter"}"#.into()),
            "Items" => nbt_list![
                nbt_compound! {
                    "Slot" => NbtValue::Byte(0),
                    "id" => NbtValue::String("minecraft:redstone".into()),
                    "count" => NbtValue::Int(12)
                },
                nbt_compound! {
                    "Slot" => NbtValue::Byte(8),
                    "id" => NbtValue::String("minecraft:hopper".into()),
                    "count" => NbtValue::Int(1)
                }
            ]
        }
    }

    #[test]
    fn test_dropper_import() {
        let mut dropper = Dropper::new(BlockPos::new(0, 0, 0));
        dropper.import_nbt(&dropper_nbt()).unwrap();

        assert_eq!(dropper.kind(), BlockEntityType::Dropper);
        assert_eq!(dropper.position(), BlockPos::new(-12, 64, 300));
        assert_eq!(dropper.display_name("Dropper"), "Sorter");
        assert_eq!(dropper.inventory().size(), 9);
        assert_eq!(
            dropper.inventory().get(0),
            Some(&StoredItem::new(Identifier::minecraft("redstone"), 12))
        );
        assert_eq!(dropper.inventory().items().count(), 2);
    }

    #[test]
    fn test_dropper_without_name() {
        let mut dropper = Dropper::new(BlockPos::new(1, 2, 3));
        dropper
            .import_nbt(&nbt_compound! { "Items" => nbt_list![] })
            .unwrap();
        assert!(!dropper.has_custom_name());
        assert_eq!(dropper.display_name("Dropper"), "Dropper");
        assert_eq!(dropper.position(), BlockPos::new(1, 2, 3));
    }

    #[test]
    fn test_from_nbt_dispatch() {
        let entity = AnyBlockEntity::from_nbt(&dropper_nbt()).unwrap();
        assert!(matches!(entity, AnyBlockEntity::Dropper(_)));
        assert_eq!(entity.position(), BlockPos::new(-12, 64, 300));
        assert_eq!(entity.as_inventory().inventory().items().count(), 2);

        let err = AnyBlockEntity::from_nbt(&nbt_compound! {
            "id" => NbtValue::String("minecraft:furnace".into())
        })
        .unwrap_err();
        assert_eq!(err, BlockEntityError::UnknownType("minecraft:furnace".into()));
        assert_eq!(
            AnyBlockEntity::from_nbt(&nbt_compound! {}).unwrap_err(),
            BlockEntityError::MissingId
        );
    }

    #[test]
    fn test_from_packet() {
        // Packet NBT has neither id nor coordinates.
        let nbt = nbt_compound! {
            "TransferCooldown" => NbtValue::Int(4),
            "Items" => nbt_list![nbt_compound! {
                "Slot" => NbtValue::Byte(4),
                "id" => NbtValue::String("minecraft:iron_ingot".into()),
                "count" => NbtValue::Int(2)
            }]
        };
        let pos = BlockPos::new(5, 70, -5);
        let entity = AnyBlockEntity::from_packet(17, pos, Some(&nbt)).unwrap().unwrap();
        let AnyBlockEntity::Hopper(hopper) = &entity else {
            panic!("expected hopper, got {entity:?}");
        };
        assert_eq!(hopper.transfer_cooldown, 4);
        assert_eq!(hopper.position(), pos);
        assert!(hopper.inventory().get(4).is_some());

        let chest = AnyBlockEntity::from_packet(1, pos, None).unwrap().unwrap();
        assert_eq!(chest.kind(), BlockEntityType::Chest);
        assert!(chest.as_inventory().inventory().is_empty());
        assert!(!chest.as_nameable().has_custom_name());

        // Furnace: not modelled.
        assert_eq!(AnyBlockEntity::from_packet(0, pos, None).unwrap(), None);
    }

    #[test]
    fn test_chest_slot_range() {
        let mut chest = Chest::new(BlockPos::new(0, 0, 0));
        let err = chest
            .import_nbt(&nbt_compound! {
                "Items" => nbt_list![nbt_compound! {
                    "Slot" => NbtValue::Byte(27),
                    "id" => NbtValue::String("minecraft:stone".into())
                }]
            })
            .unwrap_err();
        assert_eq!(err, BlockEntityError::SlotOutOfRange { slot: 27, size: 27 });
    }

    #[test]
    fn test_failed_import_leaves_entity_untouched() {
        let mut dropper = Dropper::new(BlockPos::new(1, 2, 3));
        let err = dropper
            .import_nbt(&nbt_compound! {
                "x" => NbtValue::Int(100),
                "y" => NbtValue::Int(100),
                "z" => NbtValue::Int(100),
                "Items" => nbt_list![nbt_compound! {
                    "Slot" => NbtValue::Byte(0),
                    "id" => NbtValue::String("minecraft:stone".into())
                }],
                "CustomName" => NbtValue::Int(7)
            })
            .unwrap_err();
        assert!(matches!(err, BlockEntityError::TypeMismatch { expected: "string", .. }));
        assert_eq!(dropper.position(), BlockPos::new(1, 2, 3));
        assert!(dropper.inventory().is_empty());
        assert!(!dropper.has_custom_name());
    }

    #[test]
    fn test_hopper_cooldown_range() {
        let mut hopper = Hopper::new(BlockPos::new(0, 0, 0));
        let err = hopper
            .import_nbt(&nbt_compound! {
                "x" => NbtValue::Int(9),
                "y" => NbtValue::Int(9),
                "z" => NbtValue::Int(9),
                "TransferCooldown" => NbtValue::Long(i64::from(i32::MAX) + 1)
            })
            .unwrap_err();
        assert_eq!(
            err,
            BlockEntityError::ValueOutOfRange {
                field: "TransferCooldown",
                value: i64::from(i32::MAX) + 1
            }
        );
        assert_eq!(hopper.transfer_cooldown, -1);
        assert_eq!(hopper.position(), BlockPos::new(0, 0, 0));

        hopper
            .import_nbt(&nbt_compound! { "TransferCooldown" => NbtValue::Int(8) })
            .unwrap();
        assert_eq!(hopper.transfer_cooldown, 8);
    }

    #[test]
    fn test_set_custom_name_through_trait() {
        let mut dispenser = Dispenser::new(BlockPos::new(0, 0, 0));
        dispenser.set_custom_name(Some(TextComponent::plain("Trap")));
        assert_eq!(dispenser.display_name("Dispenser"), "Trap");
        dispenser.set_custom_name(None);
        assert!(!dispenser.has_custom_name());
    }
}
