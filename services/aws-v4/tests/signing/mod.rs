mod selection;
mod vectors;

use chrono::{TimeZone, Utc};
use cloudsign_aws_v4::{Credential, RequestSigner};
use cloudsign_core::time::DateTime;
use cloudsign_core::{Context, SignRequest};
use http::request::Parts;
use http::{HeaderMap, Method, Request};

pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
pub const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

/// 2015-08-30T12:36:00Z, the date every signature here is computed at.
pub fn signing_time() -> DateTime {
    Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
}

pub fn credential(session_token: Option<&str>) -> Credential {
    Credential {
        access_key_id: ACCESS_KEY_ID.to_string(),
        secret_access_key: SECRET_ACCESS_KEY.to_string(),
        session_token: session_token.map(|v| v.to_string()),
        expires_in: None,
    }
}

pub fn request_parts(method: Method, uri: &str, headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
        builder = builder.header(*k, *v);
    }
    builder
        .body(())
        .expect("request must be valid")
        .into_parts()
        .0
}

/// Sign `parts` in place with a fixed clock and return the resulting headers.
pub async fn sign(
    signer: RequestSigner,
    parts: &mut Parts,
    payload: Option<&[u8]>,
    cred: &Credential,
) -> anyhow::Result<HeaderMap> {
    let _ = env_logger::builder().is_test(true).try_init();

    let signer = signer.with_time(signing_time());
    signer
        .sign_request(&Context::new(), parts, payload, Some(cred))
        .await?;
    Ok(parts.headers.clone())
}
