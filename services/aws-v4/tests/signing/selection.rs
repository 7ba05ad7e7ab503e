use super::{credential, request_parts, sign, signing_time};
use anyhow::Result;
use cloudsign_aws_v4::{RequestSigner, StaticCredentialProvider};
use cloudsign_core::{Context, ErrorKind, Signer};
use http::header::AUTHORIZATION;
use http::Method;
use pretty_assertions::assert_eq;

fn signed_headers(authorization: &str) -> &str {
    authorization
        .split(", ")
        .find_map(|v| v.strip_prefix("SignedHeaders="))
        .expect("authorization must carry signed headers")
}

#[tokio::test]
async fn test_wildcard_skips_client_context() -> Result<()> {
    let mut parts = request_parts(
        Method::GET,
        "https://example.amazonaws.com/",
        &[("x-amz-client-context", "ctx"), ("x-amz-meta-foo", "bar")],
    );

    let headers = sign(
        RequestSigner::new("service", "us-east-1"),
        &mut parts,
        None,
        &credential(None),
    )
    .await?;
    assert_eq!(
        signed_headers(headers[AUTHORIZATION].to_str()?),
        "host;x-amz-meta-foo"
    );
    Ok(())
}

#[tokio::test]
async fn test_generated_headers_are_not_signed() -> Result<()> {
    let mut parts = request_parts(Method::GET, "https://example.amazonaws.com/", &[]);

    let headers = sign(
        RequestSigner::new("service", "us-east-1").with_include_headers(["*"]),
        &mut parts,
        None,
        &credential(Some("token")),
    )
    .await?;
    assert_eq!(signed_headers(headers[AUTHORIZATION].to_str()?), "host");
    assert!(headers.contains_key("x-amz-date"));
    assert!(headers.contains_key("x-amz-security-token"));
    Ok(())
}

#[tokio::test]
async fn test_repeated_header_is_signed_once() -> Result<()> {
    let mut parts = request_parts(
        Method::GET,
        "https://example.amazonaws.com/",
        &[("X-Custom", "b"), ("x-custom", "a")],
    );

    let headers = sign(
        RequestSigner::new("service", "us-east-1").with_include_headers(["host", "X-Custom"]),
        &mut parts,
        None,
        &credential(None),
    )
    .await?;
    assert_eq!(
        signed_headers(headers[AUTHORIZATION].to_str()?),
        "host;x-custom"
    );
    assert_eq!(headers.get_all("x-custom").iter().count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_missing_payload_is_empty_payload() -> Result<()> {
    let uri = "https://example.amazonaws.com/v1/robots";

    let mut parts = request_parts(Method::GET, uri, &[]);
    let without = sign(
        RequestSigner::new("execute-api", "us-east-1"),
        &mut parts,
        None,
        &credential(None),
    )
    .await?;

    let mut parts = request_parts(Method::GET, uri, &[]);
    let empty = sign(
        RequestSigner::new("execute-api", "us-east-1"),
        &mut parts,
        Some(b""),
        &credential(None),
    )
    .await?;

    assert_eq!(without[AUTHORIZATION], empty[AUTHORIZATION]);
    Ok(())
}

#[tokio::test]
async fn test_signing_twice_is_stable() -> Result<()> {
    let signer = RequestSigner::new("execute-api", "us-east-1").with_time(signing_time());
    let cred = credential(Some("token"));
    let key = signer.signing_key(&cred);

    let parts = request_parts(
        Method::POST,
        "https://example.amazonaws.com/v1/robots/abc/pmaps",
        &[("content-type", "application/json")],
    );
    let first = signer.sign_headers(
        &parts.method,
        &parts.uri,
        &parts.headers,
        Some(b"{}"),
        &cred,
        &key,
    )?;
    let second = signer.sign_headers(
        &parts.method,
        &parts.uri,
        &parts.headers,
        Some(b"{}"),
        &cred,
        &key,
    )?;

    assert_eq!(first, second);
    assert!(parts.headers.get(AUTHORIZATION).is_none());
    Ok(())
}

#[tokio::test]
async fn test_signer_with_static_credential() -> Result<()> {
    let loader = StaticCredentialProvider::new("AKIDEXAMPLE", "secret").with_session_token("token");
    let builder = RequestSigner::new("execute-api", "us-east-1").with_time(signing_time());
    let signer = Signer::new(Context::new(), loader, builder);

    let mut parts = request_parts(Method::GET, "https://example.amazonaws.com/v1/robots", &[]);
    signer.sign(&mut parts, None).await?;

    let authorization = parts.headers[AUTHORIZATION].to_str()?;
    assert!(authorization
        .starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/execute-api/aws4_request, "));
    assert_eq!(parts.headers["x-amz-security-token"], "token");
    Ok(())
}

#[tokio::test]
async fn test_signer_rejects_empty_credential() -> Result<()> {
    let signer = Signer::new(
        Context::new(),
        StaticCredentialProvider::new("", ""),
        RequestSigner::new("execute-api", "us-east-1"),
    );

    let mut parts = request_parts(Method::GET, "https://example.amazonaws.com/", &[]);
    let err = signer
        .sign(&mut parts, None)
        .await
        .expect_err("empty credential must be rejected");
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert!(parts.headers.is_empty());
    Ok(())
}
