//! Caller authentication for the HTTP surfaces.
//!
//! - **token**: HS256 access tokens issued by `/auth/token` and the Google callback
//! - **gate**: resolves a request's [`Identity`] from bearer token, API key or session cookie
//! - **google**: Google OIDC login with single-use CSRF state

mod error;
mod gate;
mod google;
mod token;

#[cfg(test)]
mod gate_test;

pub use error::{AuthError, AuthResult};
pub use gate::{AuthGate, AuthMethod, Identity, SESSION_COOKIE, require_identity, secrets_match};
#[cfg(test)]
pub use google::MockIdentityProvider;
pub use google::{
    GOOGLE_ISSUER, GoogleLogin, GoogleProvider, GoogleUser, IdentityProvider,
    LOGIN_STATE_TTL_SECS, PendingLogin,
};
pub use token::{AccessToken, Claims, DEFAULT_SCOPES, Profile, TokenIssuer};
