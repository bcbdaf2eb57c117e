//! The inventory capability: item listing and all-or-nothing transfers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Item type identifiers carried by inventories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Opens one locked door.
    Key,
}

/// A container of items that can be consulted and transferred between.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Item types currently held, in storage order.
    async fn item_types(&self) -> Vec<ItemKind>;

    /// Removes the items whose `selection` flag is set.
    ///
    /// The mask is positional over [`Inventory::item_types`]. Returns `None`
    /// and leaves the inventory untouched when the mask no longer matches
    /// the contents (another holder changed it since it was listed).
    async fn take_items(&self, selection: &[bool]) -> Option<Vec<ItemKind>>;

    /// Adds items to this inventory.
    async fn put_items(&self, items: Vec<ItemKind>);

    /// Moves the selected items of `source` into this inventory.
    ///
    /// Either every selected item moves or none does.
    async fn try_move_items_from(&self, source: &dyn Inventory, selection: &[bool]) -> bool {
        match source.take_items(selection).await {
            Some(items) => {
                self.put_items(items).await;
                true
            }
            None => false,
        }
    }
}
