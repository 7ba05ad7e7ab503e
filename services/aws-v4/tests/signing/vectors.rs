use super::{credential, request_parts, sign};
use anyhow::Result;
use cloudsign_aws_v4::{RequestSigner, DEFAULT_SIGNED_HEADERS};
use http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use http::Method;
use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

#[tokio::test]
async fn test_get_vanilla() -> Result<()> {
    let mut parts = request_parts(
        Method::GET,
        "https://example.amazonaws.com/",
        &[("host", "example.amazonaws.com"), ("x-amz-date", "20150830T123600Z")],
    );

    let signer =
        RequestSigner::new("service", "us-east-1").with_include_headers(DEFAULT_SIGNED_HEADERS);
    let headers = sign(signer, &mut parts, None, &credential(None)).await?;

    assert_eq!(
        headers[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host;x-amz-date, Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
    );
    assert_eq!(headers["x-amz-content-sha256"], EMPTY_SHA256);
    assert_eq!(headers["x-amz-date"], "20150830T123600Z");
    assert_eq!(headers[HOST], "example.amazonaws.com");
    assert!(headers.get("x-amz-security-token").is_none());
    Ok(())
}

#[tokio::test]
async fn test_get_query_order() -> Result<()> {
    let mut parts = request_parts(
        Method::GET,
        "https://example.amazonaws.com/?Param2=value2&Param1=value1",
        &[("host", "example.amazonaws.com"), ("x-amz-date", "20150830T123600Z")],
    );

    let signer =
        RequestSigner::new("service", "us-east-1").with_include_headers(DEFAULT_SIGNED_HEADERS);
    let headers = sign(signer, &mut parts, None, &credential(None)).await?;

    assert_eq!(
        headers[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host;x-amz-date, Signature=b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500"
    );
    Ok(())
}

#[tokio::test]
async fn test_post_with_payload_and_token() -> Result<()> {
    let payload = br#"{"hello":"world"}"#;
    let mut parts = request_parts(
        Method::POST,
        "https://example.amazonaws.com/v1/robots/abc/pmaps?activeDetails=2",
        &[("Content-Type", "application/json")],
    );

    let signer = RequestSigner::new("execute-api", "us-east-1");
    let headers = sign(
        signer,
        &mut parts,
        Some(payload),
        &credential(Some("session-token-example")),
    )
    .await?;

    assert_eq!(
        headers["x-amz-content-sha256"],
        hex::encode(Sha256::digest(payload)).as_str()
    );
    assert_eq!(
        headers["x-amz-content-sha256"],
        "93a23971a914e5eacbf0a8d25154cda309c3c1c72fbb9914d47c60f3cb681588"
    );
    assert_eq!(headers["x-amz-security-token"], "session-token-example");
    assert!(headers["x-amz-security-token"].is_sensitive());
    assert_eq!(
        headers[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/execute-api/aws4_request, SignedHeaders=host, Signature=9acbcdab69a68e6690cc45f4f2294897d7513510b422a863d0410aa13be2b408"
    );
    assert_eq!(headers[CONTENT_TYPE], "application/json");
    Ok(())
}

#[tokio::test]
async fn test_lowercase_method_and_dot_segments() -> Result<()> {
    let mut parts = request_parts(
        Method::from_bytes(b"get")?,
        "https://example.amazonaws.com:8443/a/./b/../c//d/",
        &[],
    );

    let signer = RequestSigner::new("service", "us-east-1");
    let headers = sign(signer, &mut parts, None, &credential(None)).await?;

    assert_eq!(
        headers[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host, Signature=910082bc03c33ab5e33c70ffb865ea9ef5b5b36b0fd1ce89fea5591e72fa1cba"
    );
    // The host used for signing is never written back.
    assert!(headers.get(HOST).is_none());
    assert_eq!(headers.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_s3_put_object() -> Result<()> {
    let mut parts = request_parts(
        Method::PUT,
        "https://bucket.s3.amazonaws.com/photos/my%20cat.jpg?versionId=3&acl",
        &[
            ("x-amz-meta-owner", "  jane   doe "),
            ("x-amz-client-context", "ctx"),
            ("x-amz-date", "20150830T123600Z"),
            ("Content-Type", "image/jpeg"),
        ],
    );

    let signer = RequestSigner::new("s3", "us-east-1");
    let headers = sign(signer, &mut parts, Some(b"cat"), &credential(Some("tok"))).await?;

    assert_eq!(
        headers["x-amz-content-sha256"],
        "77af778b51abd4a3c51c5ddd97204a9c3ae614ebccb75a606c3b6865aed6744e"
    );
    assert_eq!(
        headers[AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/s3/aws4_request, SignedHeaders=host;x-amz-date;x-amz-meta-owner, Signature=efc5a8a34d2447c5452cf3428f6c8ed8c67602c8b6e4b5dbef4084d23919a689"
    );
    // Caller headers are sent untouched.
    assert_eq!(headers["x-amz-meta-owner"], "  jane   doe ");
    assert_eq!(headers["x-amz-client-context"], "ctx");
    assert_eq!(headers["x-amz-security-token"], "tok");
    Ok(())
}
