//! Portable digest and HMAC provider used for request signing
//!
//! Two interchangeable implementations exist: [`Md5Crypto`] computes real
//! MD5 content checksums, while [`TruncatedSha256Crypto`] substitutes the
//! first 16 bytes of a SHA-256 hash for builds where MD5 is excluded
//! (disable the `md5` cargo feature). Both sign with HMAC-SHA256.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use once_cell::sync::OnceCell;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Digest and keyed-signature primitives needed by the request signer.
///
/// Both operations are pure: no state is retained between calls.
pub trait PortableCrypto: std::fmt::Debug {
    /// 128-bit content fingerprint of the UTF-8 bytes of `data`, hex encoded
    fn digest(&self, data: &str) -> String;

    /// HMAC-SHA256 over the UTF-8 bytes of `data` keyed by `key`, base64 encoded
    fn hmac(&self, key: &str, data: &str) -> String;
}

/// Provider backed by MD5 content checksums
#[cfg(feature = "md5")]
#[derive(Debug, Default)]
pub struct Md5Crypto;

#[cfg(feature = "md5")]
impl PortableCrypto for Md5Crypto {
    fn digest(&self, data: &str) -> String {
        use md5::Digest as _;

        let mut hasher = md5::Md5::new();
        hasher.update(data.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn hmac(&self, key: &str, data: &str) -> String {
        hmac_sha256(key, data)
    }
}

/// Fallback provider: SHA-256 truncated to 16 bytes stands in for MD5.
///
/// Deterministic and collision-resistant, which is all the signing
/// protocol requires from the checksum.
#[derive(Debug, Default)]
pub struct TruncatedSha256Crypto;

impl PortableCrypto for TruncatedSha256Crypto {
    fn digest(&self, data: &str) -> String {
        use sha2::Digest as _;

        let hash = Sha256::digest(data.as_bytes());
        hex::encode(&hash[..16])
    }

    fn hmac(&self, key: &str, data: &str) -> String {
        hmac_sha256(key, data)
    }
}

fn hmac_sha256(key: &str, data: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(data.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

static INSTANCE: OnceCell<Box<dyn PortableCrypto + Send + Sync>> = OnceCell::new();

/// Process-wide provider instance, resolved lazily on first use
pub fn provider() -> &'static (dyn PortableCrypto + Send + Sync) {
    INSTANCE.get_or_init(default_provider).as_ref()
}

#[cfg(feature = "md5")]
fn default_provider() -> Box<dyn PortableCrypto + Send + Sync> {
    Box::new(Md5Crypto)
}

#[cfg(not(feature = "md5"))]
fn default_provider() -> Box<dyn PortableCrypto + Send + Sync> {
    Box::new(TruncatedSha256Crypto)
}
