//! Business-logic layer: credential verification, token issuance,
//! session lifecycle, and account mutations with their authorization
//! policy.

mod account;
mod credentials;
pub mod error;
mod jwt;
mod session;

pub use account::AccountService;
pub use credentials::CredentialService;
pub use error::ServiceError;
pub use jwt::{AccessTokenClaims, JwtService, RefreshTokenClaims, TokenError, TokenResponse};
pub use session::SessionService;
