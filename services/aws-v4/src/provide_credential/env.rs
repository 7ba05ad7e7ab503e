use crate::{constants::*, Credential};
use async_trait::async_trait;
use cloudsign_core::time::parse_rfc3339;
use cloudsign_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads AWS credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `AWS_ACCESS_KEY_ID`: The AWS access key ID
/// - `AWS_SECRET_ACCESS_KEY`: The AWS secret access key
/// - `AWS_SESSION_TOKEN`: The AWS session token (optional)
/// - `AWS_CREDENTIAL_EXPIRATION`: RFC3339 expiration of a temporary credential (optional)
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        let (Some(ak), Some(sk)) = (envs.get(AWS_ACCESS_KEY_ID), envs.get(AWS_SECRET_ACCESS_KEY))
        else {
            return Ok(None);
        };

        let expires_in = envs
            .get(AWS_CREDENTIAL_EXPIRATION)
            .map(|v| parse_rfc3339(v))
            .transpose()?;

        Ok(Some(Credential {
            access_key_id: ak.clone(),
            secret_access_key: sk.clone(),
            session_token: envs.get(AWS_SESSION_TOKEN).cloned(),
            expires_in,
        }))
    }
}
