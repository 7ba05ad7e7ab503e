use crate::Credential;
use async_trait::async_trait;
use cloudsign_core::time::DateTime;
use cloudsign_core::{Context, ProvideCredential, Result};

/// StaticCredentialProvider hands out the same credential on every call.
///
/// This is how credentials obtained from a login endpoint are handed to the
/// signer: the caller logs in, builds this provider from the returned key
/// triple and builds a new one once it expires.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credential: Credential,
}

impl StaticCredentialProvider {
    /// Create a new StaticCredentialProvider with access key ID and secret access key.
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            credential: Credential {
                access_key_id: access_key_id.to_string(),
                secret_access_key: secret_access_key.to_string(),
                session_token: None,
                expires_in: None,
            },
        }
    }

    /// Set the session token.
    pub fn with_session_token(mut self, token: &str) -> Self {
        self.credential.session_token = Some(token.to_string());
        self
    }

    /// Set the time after which the credential is no longer accepted.
    pub fn with_expires_in(mut self, expires_in: DateTime) -> Self {
        self.credential.expires_in = Some(expires_in);
        self
    }
}

#[async_trait]
impl ProvideCredential for StaticCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
        Ok(Some(self.credential.clone()))
    }
}
