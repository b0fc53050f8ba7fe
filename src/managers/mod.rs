// Wishclip state managers
// Managers own popup state: the ephemeral store, its three repositories, and the submission controller.

pub mod auth_cache;
pub mod dedup_ledger;
pub mod ephemeral_store;
pub mod preference_store;
pub mod submission_controller;
