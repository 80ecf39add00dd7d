//! Id-keyed snapshot store shared by the resource containers. Every
//! mutation goes through [`ResourceStore::apply`], so the loading/error
//! machine has a single transition point.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

#[derive(Debug)]
pub enum Change<T> {
    LoadStarted,
    /// Wholesale replacement with a fresh backend listing.
    Loaded(Vec<(String, T)>),
    /// Insert or replace a single record.
    Merged(String, T),
    Removed(String),
    Failed(String),
    Cleared,
}

#[derive(Debug)]
struct StoreState<T> {
    items: HashMap<String, T>,
    loading: bool,
    error: Option<String>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            loading: false,
            error: None,
        }
    }
}

#[derive(Debug)]
pub struct ResourceStore<T> {
    state: Arc<RwLock<StoreState<T>>>,
}

impl<T: Clone> Default for ResourceStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ResourceStore<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Clone> ResourceStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }

    pub async fn apply(&self, change: Change<T>) {
        let mut state = self.state.write().await;
        match change {
            Change::LoadStarted => {
                state.loading = true;
                state.error = None;
            }
            Change::Loaded(items) => {
                state.items = items.into_iter().collect();
                state.loading = false;
                state.error = None;
            }
            Change::Merged(id, item) => {
                state.items.insert(id, item);
                state.loading = false;
                state.error = None;
            }
            Change::Removed(id) => {
                state.items.remove(&id);
                state.loading = false;
                state.error = None;
            }
            Change::Failed(message) => {
                state.loading = false;
                state.error = Some(message);
            }
            Change::Cleared => {
                state.items.clear();
                state.loading = false;
                state.error = None;
            }
        }
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.state.read().await.items.get(id).cloned()
    }

    pub async fn items(&self) -> Vec<T> {
        self.state.read().await.items.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.items.is_empty()
    }

    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_cycle_clears_error_and_loading() {
        let store: ResourceStore<u32> = ResourceStore::new();
        store.apply(Change::LoadStarted).await;
        assert!(store.loading().await);

        store
            .apply(Change::Loaded(vec![("a".into(), 1), ("b".into(), 2)]))
            .await;
        assert!(!store.loading().await);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("a").await, Some(1));
    }

    #[tokio::test]
    async fn failure_records_the_message_and_keeps_items() {
        let store: ResourceStore<u32> = ResourceStore::new();
        store.apply(Change::Merged("a".into(), 1)).await;
        store.apply(Change::LoadStarted).await;
        store.apply(Change::Failed("backend gone".into())).await;

        assert!(!store.loading().await);
        assert_eq!(store.error().await.as_deref(), Some("backend gone"));
        assert_eq!(store.get("a").await, Some(1));
    }

    #[tokio::test]
    async fn merge_is_last_write_wins() {
        let store: ResourceStore<u32> = ResourceStore::new();
        store.apply(Change::Merged("a".into(), 1)).await;
        store.apply(Change::Merged("a".into(), 9)).await;
        assert_eq!(store.get("a").await, Some(9));

        store.apply(Change::Removed("a".into())).await;
        assert!(store.is_empty().await);
    }
}
