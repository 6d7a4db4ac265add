//! Cross-site request forgery tokens for the search form.
//!
//! `GET /` sets an `_xsrf` cookie and embeds the same token in the form.
//! `POST /search` is accepted only when the cookie and the form field carry
//! the same token and that token was signed with this server's key.
//!
//! Invariants:
//! - A token is `<nonce>.<hex hmac-sha256 of nonce>`.
//! - Verification never dispatches anything; a failed check is a 403.

use hmac::{Hmac, Mac};
use hyper::HeaderMap;
use hyper::header::COOKIE;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;
use uuid::Uuid;

use crate::error::ServerError;

type HmacSha256 = Hmac<Sha256>;

/// Name of both the cookie and the form field.
pub const XSRF_NAME: &str = "_xsrf";

/// Issues and checks signed form tokens.
#[derive(Clone)]
pub struct XsrfGuard {
    key: SecretString,
}

impl XsrfGuard {
    pub fn new(key: SecretString) -> Self {
        Self { key }
    }

    /// Guard with a per-process random key. Tokens stop verifying after a restart.
    pub fn random() -> Self {
        let key = format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        Self::new(SecretString::new(key.into()))
    }

    fn mac(&self, nonce: &str) -> Result<HmacSha256, ServerError> {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret().as_bytes())
            .map_err(|e| ServerError::Internal(format!("XSRF key rejected: {e}")))?;
        mac.update(nonce.as_bytes());
        Ok(mac)
    }

    /// A fresh signed token.
    pub fn issue(&self) -> Result<String, ServerError> {
        let nonce = Uuid::new_v4().simple().to_string();
        let signature = hex::encode(self.mac(&nonce)?.finalize().into_bytes());
        Ok(format!("{nonce}.{signature}"))
    }

    /// Whether `token` was issued with this guard's key.
    pub fn is_signed(&self, token: &str) -> bool {
        let Some((nonce, signature)) = token.split_once('.') else {
            return false;
        };
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        self.mac(nonce)
            .is_ok_and(|mac| mac.verify_slice(&signature).is_ok())
    }

    /// Accept a submission only if cookie and field hold the same signed token.
    pub fn check(&self, cookie: Option<&str>, field: Option<&str>) -> Result<(), ServerError> {
        let field = field.ok_or_else(|| {
            ServerError::Forbidden(format!("'{XSRF_NAME}' argument missing from POST"))
        })?;
        let cookie = cookie.ok_or_else(|| {
            ServerError::Forbidden(format!("'{XSRF_NAME}' cookie missing"))
        })?;
        if !bool::from(cookie.as_bytes().ct_eq(field.as_bytes())) {
            return Err(ServerError::Forbidden(
                "XSRF cookie does not match POST argument".to_string(),
            ));
        }
        if !self.is_signed(cookie) {
            debug!("Rejected XSRF token with a bad signature");
            return Err(ServerError::Forbidden("Invalid XSRF token".to_string()));
        }
        Ok(())
    }
}

/// The `_xsrf` cookie value sent with the request, if any.
pub fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == XSRF_NAME)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying `token`.
pub fn set_cookie(token: &str) -> String {
    format!("{XSRF_NAME}={token}; Path=/; SameSite=Strict; HttpOnly")
}
