pub mod cli;
pub mod scorecard;
pub mod store;

use once_cell::sync::OnceCell;
use std::sync::Arc;

// Global record store instance
static STORE: OnceCell<Arc<store::SqliteStore>> = OnceCell::new();

/// Get the global record store
pub fn record_store() -> Arc<store::SqliteStore> {
    STORE.get().expect("Record store not initialized").clone()
}

/// Initialize the global record store (called once at startup)
pub fn init_store(store: Arc<store::SqliteStore>) {
    STORE.set(store).ok().expect("Record store already initialized");
}

// Global sync coordinator instance
static COORDINATOR: OnceCell<scorecard::SyncCoordinator> = OnceCell::new();

/// Get a clone of the global sync coordinator
pub fn coordinator() -> scorecard::SyncCoordinator {
    COORDINATOR.get().expect("Sync coordinator not initialized").clone()
}

/// Initialize the global sync coordinator (called once at startup)
pub fn init_coordinator(coordinator: scorecard::SyncCoordinator) {
    COORDINATOR
        .set(coordinator)
        .ok()
        .expect("Sync coordinator already initialized");
}
