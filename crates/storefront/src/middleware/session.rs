//! Session middleware configuration.
//!
//! Sessions live in process memory; the cookie only carries a signed id.

use secrecy::ExposeSecret;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "fsad_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
///
/// The cookie is signed with a key derived from the session secret, which
/// config validation guarantees is at least 64 bytes.
///
/// # Errors
///
/// Returns an error if the secret is too short to derive a signing key.
pub fn create_session_layer(
    config: &StorefrontConfig,
) -> Result<SessionManagerLayer<MemoryStore, tower_sessions::service::SignedCookie>, SessionKeyError>
{
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())
        .map_err(|_| SessionKeyError)?;

    Ok(SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}

/// The session secret is too short to sign cookies.
#[derive(Debug, thiserror::Error)]
#[error("session secret must be at least 64 bytes")]
pub struct SessionKeyError;
