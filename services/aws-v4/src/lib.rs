//! AWS SigV4 signing for services reached with temporary cloud credentials.
//!
//! The signer computes the Signature Version 4 `Authorization` header for an
//! HTTP request and hands back the headers to send with it. Headers are
//! signed by selection: only the ones present on the request and named by
//! the include list (see [`IROBOT_SIGNED_HEADERS`] and
//! [`DEFAULT_SIGNED_HEADERS`]) go into the signature.
//!
//! ## Example
//!
//! ```no_run
//! use cloudsign_aws_v4::{RequestSigner, StaticCredentialProvider};
//! use cloudsign_core::{Context, Signer};
//!
//! # async fn example() -> cloudsign_core::Result<()> {
//! let loader = StaticCredentialProvider::new("ASIAEXAMPLE", "secret")
//!     .with_session_token("session-token");
//! let builder = RequestSigner::new("execute-api", "us-east-1");
//! let signer = Signer::new(Context::new(), loader, builder);
//!
//! let mut parts = http::Request::get("https://example.amazonaws.com/v1/robots/abc/pmaps")
//!     .body(())?
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts, None).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod canonical;
pub use canonical::canonicalize_headers;
pub use canonical::canonicalize_path;
pub use canonical::canonicalize_query;
pub use canonical::normalize_whitespace;
pub use canonical::CanonicalHeaders;

mod config;
pub use config::Config;

mod constants;
pub use constants::DEFAULT_SIGNED_HEADERS;
pub use constants::IROBOT_SIGNED_HEADERS;

mod credential;
pub use credential::Credential;

mod key;
pub use key::SigningKey;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::RequestSigner;
