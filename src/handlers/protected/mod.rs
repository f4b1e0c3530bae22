// handlers/protected/mod.rs - Handlers behind the identity resolver
//
// Every route here runs after `middleware::require_user`, which places
// `CurrentUser` in the request extensions.

pub mod auth;
pub mod reports;

pub use auth::*;
pub use reports::*;
