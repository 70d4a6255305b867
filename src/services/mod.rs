pub mod catalog;
pub mod favorites;
pub mod sync;
pub mod users;

pub use catalog::CatalogService;
pub use favorites::{D1FavoritesStore, FavoritesLedger, FavoritesStore};
pub use sync::{FavoritesApi, SyncSession};
pub use users::UserService;
