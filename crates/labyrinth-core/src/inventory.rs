//! In-memory inventory shared between a maze cell and its visitors.

use async_trait::async_trait;
use labyrinth_proto::{Inventory, ItemKind};
use tokio::sync::Mutex;

/// An item list guarded by an async mutex.
#[derive(Debug, Default)]
pub struct SharedInventory {
    items: Mutex<Vec<ItemKind>>,
}

impl SharedInventory {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an inventory holding `items`.
    pub fn with_items(items: impl IntoIterator<Item = ItemKind>) -> Self {
        Self {
            items: Mutex::new(items.into_iter().collect()),
        }
    }
}

#[async_trait]
impl Inventory for SharedInventory {
    async fn item_types(&self) -> Vec<ItemKind> {
        self.items.lock().await.clone()
    }

    async fn take_items(&self, selection: &[bool]) -> Option<Vec<ItemKind>> {
        let mut items = self.items.lock().await;
        if items.len() != selection.len() {
            return None;
        }

        let mut taken = Vec::new();
        let mut kept = Vec::new();
        for (item, selected) in items.drain(..).zip(selection) {
            if *selected {
                taken.push(item);
            } else {
                kept.push(item);
            }
        }
        *items = kept;
        Some(taken)
    }

    async fn put_items(&self, new_items: Vec<ItemKind>) {
        self.items.lock().await.extend(new_items);
    }
}
