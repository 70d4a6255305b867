pub mod favorites_ledger_test;
pub mod sync_session_test;
