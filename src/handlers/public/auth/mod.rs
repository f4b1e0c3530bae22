// handlers/public/auth/mod.rs - Token acquisition endpoints (no authentication required)

pub mod register; // POST /auth/register
pub mod session;  // POST /auth/login, POST /auth/logout
pub mod utils;

pub use register::register_post;
pub use session::{login_post, logout_post};
