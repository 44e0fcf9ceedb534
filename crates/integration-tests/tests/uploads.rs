//! Direct-upload flow over real HTTP: negotiate, transfer, and failure
//! mapping.

use std::sync::atomic::Ordering;

use green_mango_client::upload::checksum::content_checksum;
use green_mango_client::{LocalFile, UploadError, UploadStage};
use green_mango_integration_tests::TestContext;

fn jpeg(name: &str, bytes: Vec<u8>) -> LocalFile {
    LocalFile::new(name, "image/jpeg", bytes)
}

#[tokio::test]
async fn test_upload_negotiates_then_transfers() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let body = vec![7u8; 1024];
    let reference = ctx
        .client
        .uploads()
        .upload(&jpeg("photo.jpg", body.clone()))
        .await
        .expect("upload");

    assert_eq!(reference, "signed-0");

    let negotiations = ctx.state.negotiations.lock().expect("negotiations");
    assert_eq!(negotiations.len(), 1);
    let blob = &negotiations[0];
    assert_eq!(blob["filename"], "photo.jpg");
    assert_eq!(blob["byte_size"], 1024);
    assert_eq!(blob["content_type"], "image/jpeg");
    assert_eq!(blob["checksum"], content_checksum(&body));
    drop(negotiations);

    let puts = ctx.state.storage_puts.lock().expect("storage puts");
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].blob, 0);
    assert_eq!(puts[0].body_len, 1024);
    assert_eq!(puts[0].content_length, Some(1024));
    // The negotiated headers were replayed verbatim on the PUT.
    assert_eq!(puts[0].content_type.as_deref(), Some("image/jpeg"));
}

#[tokio::test]
async fn test_validation_failure_makes_no_network_calls() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let oversized = jpeg("big.jpg", vec![0u8; 5 * 1024 * 1024 + 1]);
    let err = ctx
        .client
        .uploads()
        .upload(&oversized)
        .await
        .expect_err("oversized file");

    assert!(matches!(err, UploadError::Rejected(_)));
    assert_eq!(ctx.state.negotiate_calls.load(Ordering::SeqCst), 0);
    assert!(ctx.state.storage_puts.lock().expect("puts").is_empty());
}

#[tokio::test]
async fn test_negotiate_failure_reports_its_stage() {
    let ctx = TestContext::spawn().await;
    // No login: the negotiation endpoint rejects the missing bearer.

    let err = ctx
        .client
        .uploads()
        .upload(&jpeg("photo.jpg", vec![0u8; 64]))
        .await
        .expect_err("unauthenticated upload");

    match err {
        UploadError::Failed { stage, .. } => assert_eq!(stage, UploadStage::Negotiate),
        other => panic!("expected negotiate failure, got {other}"),
    }
    assert!(ctx.state.storage_puts.lock().expect("puts").is_empty());
}

#[tokio::test]
async fn test_storage_rejection_surfaces_status() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;
    ctx.state.storage_fails.store(true, Ordering::SeqCst);

    let err = ctx
        .client
        .uploads()
        .upload(&jpeg("photo.jpg", vec![0u8; 64]))
        .await
        .expect_err("storage rejection");

    match err {
        UploadError::StorageRejected { status, .. } => assert_eq!(status, 403),
        other => panic!("expected storage rejection, got {other}"),
    }
    // Negotiation happened; only the transfer failed.
    assert_eq!(ctx.state.negotiate_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_batch_upload_preserves_order() {
    let ctx = TestContext::spawn().await;
    ctx.login().await;

    let files = vec![
        jpeg("a.jpg", vec![1u8; 10]),
        jpeg("b.jpg", vec![2u8; 20]),
        jpeg("c.jpg", vec![3u8; 30]),
    ];
    let references = ctx
        .client
        .uploads()
        .upload_all(&files)
        .await
        .expect("batch upload");

    assert_eq!(references, vec!["signed-0", "signed-1", "signed-2"]);

    let negotiations = ctx.state.negotiations.lock().expect("negotiations");
    let filenames: Vec<&str> = negotiations
        .iter()
        .map(|blob| blob["filename"].as_str().expect("filename"))
        .collect();
    assert_eq!(filenames, vec!["a.jpg", "b.jpg", "c.jpg"]);
}
