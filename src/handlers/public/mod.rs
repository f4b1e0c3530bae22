// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod auth;
pub mod contact;

pub use auth::*;
pub use contact::contact_post;
