//! The per-page item cache.
//!
//! The board only changes in response to a confirmed server reply: the
//! canonical item from the backend replaces (or joins) the local copy.

use crate::error::Result;
use crate::models::{Item, ItemQuery, Status};
use crate::store::ItemStore;
use crate::views::{self, DashboardView, ViewFilter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemBoard {
    items: Vec<Item>,
}

impl ItemBoard {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub async fn load(store: &dyn ItemStore, query: &ItemQuery) -> Result<Self> {
        let items = store.list(query).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to load items");
            e
        })?;
        tracing::debug!(count = items.len(), "Items loaded");
        Ok(Self::new(items))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn dashboard(&self) -> DashboardView<'_> {
        views::dashboard(&self.items)
    }

    pub fn filtered(&self, filter: &ViewFilter) -> Vec<&Item> {
        views::filter_items(&self.items, filter)
    }

    /// Replace the item with the same id. Returns false if it is not cached.
    pub fn replace(&mut self, item: Item) -> bool {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Newly created items go to the top of the list.
    pub fn prepend(&mut self, item: Item) {
        self.items.insert(0, item);
    }

    pub fn remove(&mut self, id: i64) -> Option<Item> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Flip done/pending on the server, then adopt the server's copy.
    pub async fn toggle_complete(&mut self, store: &dyn ItemStore, id: i64) -> Result<&Item> {
        let current = match self.get(id) {
            Some(item) => item.status,
            None => store.get(id).await?.status,
        };
        let next = views::toggled_status(current);
        self.set_status(store, id, next).await
    }

    pub async fn set_status(
        &mut self,
        store: &dyn ItemStore,
        id: i64,
        status: Status,
    ) -> Result<&Item> {
        let updated = store.update_status(id, status).await.map_err(|e| {
            tracing::error!(item_id = id, error = %e, "Failed to update status");
            e
        })?;
        let pos = match self.items.iter().position(|i| i.id == updated.id) {
            Some(pos) => {
                self.items[pos] = updated;
                pos
            }
            None => {
                self.items.insert(0, updated);
                0
            }
        };
        Ok(&self.items[pos])
    }

    pub async fn delete(&mut self, store: &dyn ItemStore, id: i64) -> Result<()> {
        store.delete(id).await.map_err(|e| {
            tracing::error!(item_id = id, error = %e, "Failed to delete item");
            e
        })?;
        self.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClearMindError;
    use crate::store::fake::{item, Call, FakeStore};

    #[tokio::test]
    async fn test_load_lists_from_store() {
        let store = FakeStore::with_items(vec![item(1, "a", 5, Status::Pending)]);
        let board = ItemBoard::load(&store, &ItemQuery::default()).await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(store.calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn test_toggle_done_sends_pending() {
        let items = vec![item(1, "a", 5, Status::Done)];
        let store = FakeStore::with_items(items.clone());
        let mut board = ItemBoard::new(items);

        let updated = board.toggle_complete(&store, 1).await.unwrap();
        assert_eq!(updated.status, Status::Pending);
        assert_eq!(store.calls(), vec![Call::UpdateStatus(1, Status::Pending)]);
    }

    #[tokio::test]
    async fn test_toggle_other_status_sends_done() {
        for status in [Status::Pending, Status::InProgress, Status::Archived] {
            let items = vec![item(1, "a", 5, status)];
            let store = FakeStore::with_items(items.clone());
            let mut board = ItemBoard::new(items);
            board.toggle_complete(&store, 1).await.unwrap();
            assert_eq!(store.calls(), vec![Call::UpdateStatus(1, Status::Done)]);
            assert_eq!(board.get(1).unwrap().status, Status::Done);
        }
    }

    #[tokio::test]
    async fn test_toggle_uncached_item_fetches_first() {
        let store = FakeStore::with_items(vec![item(5, "remote", 5, Status::Done)]);
        let mut board = ItemBoard::default();
        let updated = board.toggle_complete(&store, 5).await.unwrap();
        assert_eq!(updated.status, Status::Pending);
        assert_eq!(
            store.calls(),
            vec![Call::Get(5), Call::UpdateStatus(5, Status::Pending)]
        );
    }

    #[tokio::test]
    async fn test_failed_toggle_leaves_board_untouched() {
        let items = vec![item(1, "a", 5, Status::Pending)];
        let store = FakeStore::with_items(items.clone());
        store.fail_next(500);
        let mut board = ItemBoard::new(items.clone());

        let err = board.toggle_complete(&store, 1).await.unwrap_err();
        assert!(matches!(err, ClearMindError::Server { status: 500, .. }));
        assert_eq!(board.items(), items.as_slice());
    }

    #[tokio::test]
    async fn test_delete_removes_after_confirmation() {
        let items = vec![item(1, "a", 5, Status::Pending), item(2, "b", 5, Status::Pending)];
        let store = FakeStore::with_items(items.clone());
        let mut board = ItemBoard::new(items);

        board.delete(&store, 1).await.unwrap();
        assert!(board.get(1).is_none());
        assert_eq!(board.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_item() {
        let items = vec![item(1, "a", 5, Status::Pending)];
        let store = FakeStore::with_items(items.clone());
        store.fail_next(401);
        let mut board = ItemBoard::new(items);

        let err = board.delete(&store, 1).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(board.get(1).is_some());
    }

    #[test]
    fn test_replace_and_prepend() {
        let mut board = ItemBoard::new(vec![item(1, "a", 5, Status::Pending)]);
        let mut renamed = item(1, "renamed", 5, Status::Pending);
        renamed.priority = 9;
        assert!(board.replace(renamed));
        assert_eq!(board.get(1).unwrap().title, "renamed");
        assert!(!board.replace(item(99, "ghost", 1, Status::Pending)));

        board.prepend(item(2, "new", 5, Status::Pending));
        assert_eq!(board.items()[0].id, 2);
    }
}
