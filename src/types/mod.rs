// Wishclip shared type definitions
// Each submodule defines plain data used across extraction, storage and the popup controller.

pub mod account;
pub mod cookie;
pub mod errors;
pub mod popup;
pub mod product;
pub mod settings;
pub mod submission;
