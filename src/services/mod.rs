// Wishclip services
// Services provide the mostly stateless engines: extraction, session lookup, the remote API client, settings.

pub mod clock;
pub mod extraction;
pub mod page_source;
pub mod session_resolver;
pub mod settings_engine;
pub mod wishlist_api;
