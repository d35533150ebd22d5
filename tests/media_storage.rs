mod common;

use std::sync::Arc;

use siopao_storefront::media::{FileStorage, StorageError};

use common::{FakeHost, TEST_FOLDER};

fn storage(host: &Arc<FakeHost>) -> FileStorage {
    FileStorage::new(host.clone(), TEST_FOLDER)
}

#[tokio::test]
async fn empty_file_is_rejected_without_contacting_the_host() {
    let host = Arc::new(FakeHost::default());
    let err = storage(&host).store(&[]).await.unwrap_err();

    assert!(matches!(err, StorageError::EmptyFile));
    assert_eq!(err.to_string(), "Failed to store empty file.");
    assert_eq!(host.upload_count(), 0);
}

#[tokio::test]
async fn store_uploads_into_the_configured_folder() {
    let host = Arc::new(FakeHost::default());
    let url = storage(&host).store(b"jpeg bytes").await.unwrap();

    assert!(url.starts_with("https://"));
    assert!(url.contains("/upload/"));
    let uploads = host.uploads.lock().unwrap().clone();
    assert_eq!(uploads, vec![(10, TEST_FOLDER.to_string())]);
}

#[tokio::test]
async fn upload_failure_is_reported() {
    let host = Arc::new(FakeHost::failing_uploads());
    let err = storage(&host).store(b"jpeg bytes").await.unwrap_err();

    assert!(matches!(err, StorageError::Upload(_)));
    assert_eq!(err.to_string(), "Failed to upload file");
}

#[tokio::test]
async fn delete_destroys_the_derived_public_id() {
    let host = Arc::new(FakeHost::default());
    storage(&host)
        .delete("https://host/upload/v123456/mk-toasted-demo/abc.jpg")
        .await;

    assert_eq!(host.destroyed(), vec!["mk-toasted-demo/abc".to_string()]);
}

#[tokio::test]
async fn delete_skips_blank_and_foreign_urls() {
    let host = Arc::new(FakeHost::default());
    let storage = storage(&host);

    storage.delete("").await;
    storage.delete("   ").await;
    storage.delete("https://example.com/images/abc.jpg").await;

    assert!(host.destroyed().is_empty());
}

#[tokio::test]
async fn delete_swallows_host_errors() {
    let host = Arc::new(FakeHost::failing_destroys());
    storage(&host)
        .delete("https://host/upload/v1/mk-toasted-demo/abc.jpg")
        .await;

    assert_eq!(host.destroyed().len(), 1);
}

#[test]
fn load_as_resource_resolves_urls_only() {
    let host = Arc::new(FakeHost::default());
    let storage = FileStorage::new(host, TEST_FOLDER);

    assert!(storage.load_as_resource("").is_none());
    assert!(storage.load_as_resource("not a url").is_none());

    let resource = storage
        .load_as_resource("https://host/upload/v1/mk-toasted-demo/abc.jpg")
        .expect("resource");
    assert_eq!(resource.url().host_str(), Some("host"));
    assert_eq!(resource.filename(), Some("abc.jpg"));
}

#[test]
fn load_as_resource_refuses_foreign_urls() {
    let host = Arc::new(FakeHost::default());
    let storage = FileStorage::new(host, TEST_FOLDER);

    assert!(storage.load_as_resource("https://evil.example/phish").is_none());
    assert!(storage.load_as_resource("javascript:alert(1)").is_none());
    assert!(
        storage
            .load_as_resource("http://host/upload/v1/mk-toasted-demo/abc.jpg")
            .is_none()
    );
}
