pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod session;
pub use session::SessionKeys;

pub mod token_service;
pub use token_service::{IssuedToken, TokenContext, TokenError, TokenService};

pub mod secret_service;
pub use secret_service::{SecretError, SecretMetadata, SecretService};
