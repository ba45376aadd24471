//! Business logic services.

pub mod auth;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use token::{Claims, TokenError, TokenIssuer};
