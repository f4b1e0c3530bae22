pub mod identity;
pub mod password;
pub mod token;

pub use identity::{extract_token, resolve_identity, IdentityError, UserDirectory, ACCESS_TOKEN_COOKIE};
pub use password::{PasswordError, PasswordHasher};
pub use token::{Claims, TokenError, TokenService};
