use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::Arc;

/// Signer is the main struct used to sign the request.
///
/// Every call loads a fresh credential from the provider; nothing is
/// cached between calls. Providers that talk to a login endpoint are
/// expected to do their own caching.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
        }
    }

    /// Signing request.
    ///
    /// Returns a [`crate::ErrorKind::CredentialInvalid`] error if the provider
    /// has no credential or the loaded credential is not valid.
    pub async fn sign(&self, req: &mut http::request::Parts, payload: Option<&[u8]>) -> Result<()> {
        let cred = self.loader.provide_credential(&self.ctx).await?;
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "no valid credential found for signing",
            ));
        }
        debug!("loaded credential for signing: {cred:?}");

        self.builder
            .sign_request(&self.ctx, req, payload, cred.as_ref())
            .await
    }
}
