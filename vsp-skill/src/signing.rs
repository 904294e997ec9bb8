//! Media URL signing
//!
//! Media keys are resolved to time-limited URLs at render time. The media
//! host verifies
//!
//! ```text
//! {base_url}/{media_key}?expires={unix}&signature={hex(HMAC-SHA256(secret, "{media_key}\n{expires}"))}
//! ```
//!
//! using the shared secret. Path segments of the media key are
//! percent-encoded; the signed message uses the raw key.

use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use vsp_common::config::SigningConfig;

type HmacSha256 = Hmac<Sha256>;

/// Resolves a media key to a URL the playback client can fetch
pub trait UrlSigner: Send + Sync {
    fn sign(&self, media_key: &str) -> Result<String>;
}

/// HMAC-SHA256 query-string signer
#[derive(Debug, Clone)]
pub struct HmacUrlSigner {
    base_url: String,
    secret: Vec<u8>,
    expiry_secs: u64,
}

impl HmacUrlSigner {
    pub fn new(config: &SigningConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("signing.base_url must not be empty".to_string()));
        }

        Ok(Self {
            base_url,
            secret: config.secret.as_bytes().to_vec(),
            expiry_secs: config.expiry_secs,
        })
    }

    /// True when a secret is configured; without one every `sign` call fails
    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Sign `media_key` as if the current time were `now_unix`
    pub fn sign_at(&self, media_key: &str, now_unix: i64) -> Result<String> {
        if media_key.is_empty() {
            return Err(Error::Signing("empty media key".to_string()));
        }
        if self.secret.is_empty() {
            return Err(Error::Signing("no signing secret configured".to_string()));
        }

        let expires = now_unix.saturating_add(i64::try_from(self.expiry_secs).unwrap_or(i64::MAX));
        let signature = compute_signature(&self.secret, media_key, expires)?;

        Ok(format!(
            "{}/{}?expires={}&signature={}",
            self.base_url,
            encode_path(media_key),
            expires,
            signature
        ))
    }
}

impl UrlSigner for HmacUrlSigner {
    fn sign(&self, media_key: &str) -> Result<String> {
        self.sign_at(media_key, chrono::Utc::now().timestamp())
    }
}

/// Hex HMAC-SHA256 over `"{media_key}\n{expires}"`
pub fn compute_signature(secret: &[u8], media_key: &str, expires: i64) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| Error::Signing(format!("invalid signing key: {}", e)))?;
    mac.update(media_key.as_bytes());
    mac.update(b"\n");
    mac.update(expires.to_string().as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn encode_path(media_key: &str) -> String {
    media_key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer(secret: &str) -> HmacUrlSigner {
        HmacUrlSigner::new(&SigningConfig {
            base_url: "https://media.example.com/".to_string(),
            secret: secret.to_string(),
            expiry_secs: 600,
        })
        .unwrap()
    }

    #[test]
    fn test_url_layout() {
        let url = signer("s3cret").sign_at("Media/track0.mp3", 1_700_000_000).unwrap();
        let expected_sig = compute_signature(b"s3cret", "Media/track0.mp3", 1_700_000_600).unwrap();
        assert_eq!(
            url,
            format!(
                "https://media.example.com/Media/track0.mp3?expires=1700000600&signature={}",
                expected_sig
            )
        );
    }

    #[test]
    fn test_signature_is_hex_sha256() {
        let sig = compute_signature(b"key", "Media/a.mp3", 42).unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_depends_on_inputs() {
        let base = compute_signature(b"key", "Media/a.mp3", 42).unwrap();
        assert_ne!(base, compute_signature(b"other", "Media/a.mp3", 42).unwrap());
        assert_ne!(base, compute_signature(b"key", "Media/b.mp3", 42).unwrap());
        assert_ne!(base, compute_signature(b"key", "Media/a.mp3", 43).unwrap());
        assert_eq!(base, compute_signature(b"key", "Media/a.mp3", 42).unwrap());
    }

    #[test]
    fn test_path_segments_encoded() {
        let url = signer("k").sign_at("Media/Removal Men & Co.mp3", 0).unwrap();
        assert!(url.starts_with("https://media.example.com/Media/Removal%20Men%20%26%20Co.mp3?"));
    }

    #[test]
    fn test_empty_secret_fails() {
        let signer = signer("");
        assert!(!signer.has_secret());
        assert!(matches!(signer.sign("Media/a.mp3"), Err(Error::Signing(_))));
    }

    #[test]
    fn test_empty_media_key_fails() {
        assert!(matches!(signer("k").sign(""), Err(Error::Signing(_))));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = HmacUrlSigner::new(&SigningConfig {
            base_url: "/".to_string(),
            secret: "k".to_string(),
            expiry_secs: 60,
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
