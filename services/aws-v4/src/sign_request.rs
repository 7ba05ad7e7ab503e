use crate::canonical::{canonicalize_headers, canonicalize_path, canonicalize_query, CanonicalHeaders};
use crate::constants::{
    AWS4_HMAC_SHA256, IROBOT_SIGNED_HEADERS, X_AMZ_CONTENT_SHA_256, X_AMZ_DATE,
    X_AMZ_SECURITY_TOKEN,
};
use crate::{Config, Credential, SigningKey};
use async_trait::async_trait;
use cloudsign_core::hash::{hex_hmac_sha256, hex_sha256};
use cloudsign_core::time::{format_iso8601, now, DateTime};
use cloudsign_core::{Context, Error, Result, SignRequest};
use http::request::Parts;
use http::{header, HeaderMap, HeaderValue, Method, Uri};
use log::debug;
use std::fmt::Write;

/// RequestSigner that implement AWS SigV4 with signed headers.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// Only headers already present on the request and selected by the include
/// list are signed. The `x-amz-date`, `x-amz-content-sha256` and
/// `x-amz-security-token` headers written by the signer are not part of the
/// signature unless the caller set them before signing.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,
    include_headers: Vec<String>,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new builder for AWS V4 signer.
    ///
    /// Headers are selected with [`IROBOT_SIGNED_HEADERS`] until
    /// [`RequestSigner::with_include_headers`] says otherwise.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            include_headers: IROBOT_SIGNED_HEADERS.iter().map(|v| v.to_string()).collect(),

            time: None,
        }
    }

    /// Create a signer from the region and service of a [`Config`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let region = config
            .region
            .as_deref()
            .ok_or_else(|| Error::config_invalid("region is required for signing"))?;
        let service = config
            .service
            .as_deref()
            .ok_or_else(|| Error::config_invalid("service is required for signing"))?;

        Ok(Self::new(service, region))
    }

    /// Replace the list of headers to sign.
    ///
    /// Names are matched case-insensitively. `*` selects all headers and
    /// `x-amz-*` selects all `x-amz-` headers except `x-amz-client-context`.
    pub fn with_include_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.include_headers = headers
            .into_iter()
            .map(|v| v.as_ref().to_ascii_lowercase())
            .collect();
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Service name used in the credential scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region used in the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Derive the signing key of `cred` for today.
    ///
    /// The key can be reused for every request signed on the same UTC date.
    pub fn signing_key(&self, cred: &Credential) -> SigningKey {
        SigningKey::derive(
            &cred.secret_access_key,
            &self.region,
            &self.service,
            self.time.unwrap_or_else(now),
        )
    }

    /// Sign a request described by its method, uri, headers and payload.
    ///
    /// Returns the caller's headers plus `x-amz-date`,
    /// `x-amz-content-sha256`, `x-amz-security-token` (only for a non-empty
    /// session token) and `Authorization`. Headers with those names are
    /// replaced. `payload` of `None` is hashed like an empty body.
    ///
    /// `signing_key` must come from [`RequestSigner::signing_key`] on the
    /// same UTC date, its scope is copied into the signature as is.
    pub fn sign_headers(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        payload: Option<&[u8]>,
        cred: &Credential,
        signing_key: &SigningKey,
    ) -> Result<HeaderMap> {
        let now = self.time.unwrap_or_else(now);
        let amz_date = format_iso8601(now);
        let payload_hash = hex_sha256(payload.unwrap_or_default());

        let canonical_headers = canonicalize_headers(uri, headers, &self.include_headers)?;
        let creq = canonical_request_string(method, uri, &self.service, &canonical_headers, &payload_hash)?;
        debug!("calculated canonical request: {creq}");

        let scope = signing_key.scope();
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // AWS4-HMAC-SHA256
        // 20150830T123600Z
        // 20150830/<region>/<service>/aws4_request
        // <hashed_canonical_request>
        let string_to_sign = {
            let mut f = String::new();
            writeln!(f, "{AWS4_HMAC_SHA256}")?;
            writeln!(f, "{amz_date}")?;
            writeln!(f, "{scope}")?;
            write!(f, "{}", hex_sha256(creq.as_bytes()))?;
            f
        };
        debug!("calculated string to sign: {string_to_sign}");

        let signature = hex_hmac_sha256(signing_key.key(), string_to_sign.as_bytes());

        let mut signed = headers.clone();
        signed.insert(X_AMZ_DATE, HeaderValue::try_from(amz_date)?);
        signed.insert(X_AMZ_CONTENT_SHA_256, HeaderValue::try_from(payload_hash)?);
        if let Some(token) = cred.session_token.as_deref().filter(|v| !v.is_empty()) {
            let mut value = HeaderValue::from_str(token)?;
            value.set_sensitive(true);
            signed.insert(X_AMZ_SECURITY_TOKEN, value);
        }

        let mut authorization = HeaderValue::from_str(&format!(
            "{AWS4_HMAC_SHA256} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
            cred.access_key_id, canonical_headers.signed_headers,
        ))?;
        authorization.set_sensitive(true);
        signed.insert(header::AUTHORIZATION, authorization);

        Ok(signed)
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        payload: Option<&[u8]>,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            debug!("no credential provided, request is left unsigned");
            return Ok(());
        };

        // Read the clock once so the key scope and x-amz-date share a date.
        let signer = self.clone().with_time(self.time.unwrap_or_else(now));
        let signing_key = signer.signing_key(cred);
        req.headers = signer.sign_headers(
            &req.method,
            &req.uri,
            &req.headers,
            payload,
            cred,
            &signing_key,
        )?;
        Ok(())
    }
}

fn canonical_request_string(
    method: &Method,
    uri: &Uri,
    service: &str,
    headers: &CanonicalHeaders,
    payload_hash: &str,
) -> Result<String> {
    // 256 is specially chosen to avoid reallocation for most requests.
    let mut f = String::with_capacity(256);

    // Insert method
    writeln!(f, "{}", method.as_str().to_ascii_uppercase())?;
    // Insert encoded path
    writeln!(f, "{}", canonicalize_path(uri.path(), service))?;
    // Insert query
    writeln!(f, "{}", canonicalize_query(uri.query().unwrap_or_default()))?;
    // Insert signed headers, the block already ends with a newline.
    writeln!(f, "{}", headers.headers)?;
    writeln!(f, "{}", headers.signed_headers)?;
    write!(f, "{payload_hash}")?;

    Ok(f)
}
