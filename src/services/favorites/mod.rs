pub mod ledger;
pub mod store;

pub use ledger::FavoritesLedger;
pub use store::{D1FavoritesStore, FavoritesStore};
