use crate::entity::ensure_compound;
use crate::{BlockEntityError, BlockEntityResult};
use tracing::debug;
use trowel_nbt::NbtValue;
use trowel_types::Identifier;

/// An item stack as stored in block entity NBT: a string id rather than
/// the numeric registry id used on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredItem {
    pub id: Identifier,
    pub count: i32,
}

impl StoredItem {
    pub fn new(id: Identifier, count: i32) -> Self {
        Self { id, count }
    }
}

/// Fixed-size slot storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    slots: Vec<Option<StoredItem>>,
}

impl Inventory {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: usize) -> Option<&StoredItem> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Put `item` in `slot`, returning what was there.
    pub fn set(
        &mut self,
        slot: usize,
        item: Option<StoredItem>,
    ) -> BlockEntityResult<Option<StoredItem>> {
        let size = self.slots.len();
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(BlockEntityError::SlotOutOfRange {
                slot: i64::try_from(slot).unwrap_or(i64::MAX),
                size,
            })?;
        Ok(std::mem::replace(entry, item))
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Occupied slots with their index.
    pub fn items(&self) -> impl Iterator<Item = (usize, &StoredItem)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (i, item)))
    }

    /// Replace the contents with the `Items` list. A missing list leaves the
    /// inventory as it is; entries with a zero count or the air id are
    /// treated as empty.
    pub fn import_nbt(&mut self, nbt: &NbtValue) -> BlockEntityResult<()> {
        ensure_compound(nbt)?;
        let Some(items) = nbt.get("Items") else {
            return Ok(());
        };
        let items = items
            .as_list()
            .ok_or_else(|| mismatch("list", items))?;

        let mut slots = vec![None; self.slots.len()];
        for entry in items {
            ensure_compound(entry)?;
            let raw = entry
                .get("Slot")
                .and_then(|v| v.as_integer())
                .ok_or_else(|| mismatch("byte", entry.get("Slot").unwrap_or(entry)))?;
            let slot = usize::try_from(raw)
                .ok()
                .filter(|&slot| slot < slots.len())
                .ok_or(BlockEntityError::SlotOutOfRange {
                    slot: raw,
                    size: slots.len(),
                })?;
            let Some(item) = read_item(entry)? else {
                debug!(slot, "Skipping empty stored item");
                continue;
            };
            slots[slot] = Some(item);
        }
        self.slots = slots;
        Ok(())
    }
}

/// `id` plus `count` (1.20.5+) or `Count` (older saves).
fn read_item(entry: &NbtValue) -> BlockEntityResult<Option<StoredItem>> {
    let Some(raw_id) = entry.get("id").and_then(|v| v.as_str()) else {
        return Ok(None);
    };
    let id: Identifier = raw_id
        .parse()
        .map_err(|_| BlockEntityError::BadItemId(raw_id.to_string()))?;
    let raw_count = entry
        .get("count")
        .or_else(|| entry.get("Count"))
        .and_then(|v| v.as_integer())
        .unwrap_or(1);
    let count = i32::try_from(raw_count).map_err(|_| BlockEntityError::ValueOutOfRange {
        field: "count",
        value: raw_count,
    })?;
    if count <= 0 || id == Identifier::minecraft("air") {
        return Ok(None);
    }
    Ok(Some(StoredItem { id, count }))
}

fn mismatch(expected: &'static str, found: &NbtValue) -> BlockEntityError {
    BlockEntityError::TypeMismatch {
        expected,
        found: crate::entity::tag_name(found).to_string(),
    }
}

/// Block entities that hold items.
pub trait InventoryBlock {
    fn inventory(&self) -> &Inventory;

    fn inventory_mut(&mut self) -> &mut Inventory;
}

#[cfg(test)]
mod tests {
    use super::*;
    use trowel_nbt::{nbt_compound, nbt_list};

    fn item(slot: i8, id: &str, count: i32) -> NbtValue {
        nbt_compound! {
            "Slot" => NbtValue::Byte(slot),
            "id" => NbtValue::String(id.into()),
            "count" => NbtValue::Int(count)
        }
    }

    #[test]
    fn test_import_items() {
        let mut inv = Inventory::new(9);
        inv.import_nbt(&nbt_compound! {
            "Items" => nbt_list![
                item(0, "minecraft:cobblestone", 64),
                item(4, "diamond", 3),
                nbt_compound! {
                    "Slot" => NbtValue::Byte(8),
                    "id" => NbtValue::String("minecraft:arrow".into()),
                    "Count" => NbtValue::Byte(16)
                }
            ]
        })
        .unwrap();

        assert_eq!(inv.get(0), Some(&StoredItem::new(Identifier::minecraft("cobblestone"), 64)));
        assert_eq!(inv.get(4), Some(&StoredItem::new(Identifier::minecraft("diamond"), 3)));
        assert_eq!(inv.get(8).map(|i| i.count), Some(16));
        assert_eq!(inv.get(1), None);
        assert_eq!(inv.items().count(), 3);
    }

    #[test]
    fn test_import_replaces_contents() {
        let mut inv = Inventory::new(5);
        inv.set(2, Some(StoredItem::new(Identifier::minecraft("stone"), 1))).unwrap();
        inv.import_nbt(&nbt_compound! { "Items" => nbt_list![item(0, "minecraft:dirt", 2)] })
            .unwrap();
        assert_eq!(inv.get(2), None);
        assert!(inv.get(0).is_some());

        // No Items tag: untouched.
        inv.import_nbt(&nbt_compound! {}).unwrap();
        assert!(inv.get(0).is_some());

        inv.import_nbt(&nbt_compound! { "Items" => nbt_list![] }).unwrap();
        assert!(inv.is_empty());
    }

    #[test]
    fn test_import_slot_out_of_range() {
        let mut inv = Inventory::new(5);
        inv.set(0, Some(StoredItem::new(Identifier::minecraft("stone"), 1))).unwrap();
        let err = inv
            .import_nbt(&nbt_compound! { "Items" => nbt_list![item(5, "minecraft:dirt", 1)] })
            .unwrap_err();
        assert_eq!(err, BlockEntityError::SlotOutOfRange { slot: 5, size: 5 });
        // A failed import keeps the previous contents.
        assert!(inv.get(0).is_some());
    }

    #[test]
    fn test_wide_slot_is_not_truncated() {
        let mut inv = Inventory::new(9);
        let err = inv
            .import_nbt(&nbt_compound! {
                "Items" => nbt_list![nbt_compound! {
                    "Slot" => NbtValue::Long(4_294_967_296),
                    "id" => NbtValue::String("minecraft:dirt".into())
                }]
            })
            .unwrap_err();
        assert_eq!(err, BlockEntityError::SlotOutOfRange { slot: 4_294_967_296, size: 9 });
        assert!(inv.is_empty());

        let err = inv
            .import_nbt(&nbt_compound! {
                "Items" => nbt_list![nbt_compound! {
                    "Slot" => NbtValue::Byte(0),
                    "id" => NbtValue::String("minecraft:dirt".into()),
                    "count" => NbtValue::Long(1 << 40)
                }]
            })
            .unwrap_err();
        assert_eq!(
            err,
            BlockEntityError::ValueOutOfRange { field: "count", value: 1 << 40 }
        );
    }

    #[test]
    fn test_empty_entries_skipped() {
        let mut inv = Inventory::new(3);
        inv.import_nbt(&nbt_compound! {
            "Items" => nbt_list![item(0, "minecraft:air", 1), item(1, "minecraft:stick", 0)]
        })
        .unwrap();
        assert!(inv.is_empty());
    }

    #[test]
    fn test_set_out_of_range() {
        let mut inv = Inventory::new(1);
        assert!(inv.set(1, None).is_err());
        assert_eq!(inv.set(0, None).unwrap(), None);
    }
}
