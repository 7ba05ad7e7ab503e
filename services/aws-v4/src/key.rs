use crate::constants::AWS4_REQUEST;
use cloudsign_core::hash::hmac_sha256;
use cloudsign_core::time::{format_date, DateTime};
use std::fmt::{Debug, Formatter};

/// SigningKey is the derived key used to sign requests for one
/// date/region/service tuple.
///
/// The key folds in the UTC date it was derived for. A key must be derived
/// again once the date rolls over: signing with a stale key is not detected
/// here and produces a signature the remote side will reject.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningKey {
    scope: String,
    key: Vec<u8>,
}

impl SigningKey {
    /// Derive the signing key from a secret access key.
    ///
    /// ```text
    /// date_key    = HMAC("AWS4" + secret, "20150830")
    /// region_key  = HMAC(date_key, region)
    /// service_key = HMAC(region_key, service)
    /// signing_key = HMAC(service_key, "aws4_request")
    /// ```
    pub fn derive(secret_access_key: &str, region: &str, service: &str, time: DateTime) -> Self {
        let date = format_date(time);

        // Sign secret
        let secret = format!("AWS4{secret_access_key}");
        // Sign date
        let sign_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
        // Sign region
        let sign_region = hmac_sha256(&sign_date, region.as_bytes());
        // Sign service
        let sign_service = hmac_sha256(&sign_region, service.as_bytes());
        // Sign request
        let key = hmac_sha256(&sign_service, AWS4_REQUEST.as_bytes());

        Self {
            scope: format!("{date}/{region}/{service}/{AWS4_REQUEST}"),
            key,
        }
    }

    /// Scope of this key: `20150830/<region>/<service>/aws4_request`.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Raw 32 bytes of the derived key.
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("scope", &self.scope)
            .field("key", &"***")
            .finish()
    }
}
