pub mod jwt;

pub use jwt::{AuthError, Claims, Identity, TokenVerifier};
