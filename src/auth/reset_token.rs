//! Signed, expiring tokens for password reset links.

use axum_extra::extract::cookie::Key;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::{Token, UserId},
};

/// How long a password reset link remains valid.
pub(super) const RESET_TOKEN_DURATION: Duration = Duration::hours(1);

/// Create a signed reset token for `user_id` that expires after `duration`.
///
/// The token is the base64 URL-safe encoding of a JSON payload joined with an
/// HMAC-SHA512 tag over that payload, so that it can be embedded in a link.
pub(super) fn create_reset_token(
    user_id: UserId,
    duration: Duration,
    key: &Key,
) -> Result<String, Error> {
    let token = Token {
        user_id,
        expires_at: OffsetDateTime::now_utc() + duration,
    };
    let token_json = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    let payload = URL_SAFE_NO_PAD.encode(token_json.as_bytes());
    let signature = sign_payload(&payload, key);

    Ok(format!("{payload}.{signature}"))
}

/// Check the signature and expiry of a reset token and return the user ID it
/// was issued for.
///
/// # Errors
/// Returns [Error::InvalidResetToken] if the token is malformed, the signature
/// does not match or the expiry time has passed.
pub(super) fn verify_reset_token(token_string: &str, key: &Key) -> Result<UserId, Error> {
    let (payload, signature) = token_string
        .split_once('.')
        .ok_or(Error::InvalidResetToken)?;

    let signature_bytes = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| Error::InvalidResetToken)?;
    let mut mac = payload_mac(payload, key);
    // verify_slice compares in constant time.
    mac.verify_slice(&signature_bytes)
        .map_err(|_| Error::InvalidResetToken)?;

    let token_json = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| Error::InvalidResetToken)?;
    let token: Token =
        serde_json::from_slice(&token_json).map_err(|_| Error::InvalidResetToken)?;

    if token.expires_at <= OffsetDateTime::now_utc() {
        return Err(Error::InvalidResetToken);
    }

    Ok(token.user_id)
}

fn sign_payload(payload: &str, key: &Key) -> String {
    let mac = payload_mac(payload, key);

    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

fn payload_mac(payload: &str, key: &Key) -> Hmac<Sha512> {
    let mut mac = Hmac::<Sha512>::new_from_slice(key.signing())
        .expect("HMAC can use a key of any length");
    mac.update(payload.as_bytes());

    mac
}
