pub mod cache;
pub mod session;

pub use cache::{CacheStorage, LocalFavoritesCache, MemoryStorage};
pub use session::{FavoritesApi, MergeOutcome, PendingToggle, SyncPhase, SyncSession};
