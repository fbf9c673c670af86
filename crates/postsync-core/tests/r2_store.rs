//! Publish protocol against an S3-compatible HTTP endpoint.

use postsync_core::{ContentId, ObjectStorageClient, PublishStep, StorageSnapshot, SyncError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUCKET: &str = "posts-bucket";

fn snapshot(server: &MockServer) -> StorageSnapshot {
    StorageSnapshot {
        endpoint: server.uri(),
        bucket: BUCKET.to_string(),
        access_key: "AKIDEXAMPLE".to_string(),
        secret_key: "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY".to_string(),
    }
}

fn listing(prefix: &str, keys: &[&str]) -> String {
    let contents: String = keys
        .iter()
        .map(|key| format!("<Contents><Key>{}</Key><Size>4</Size></Contents>", key))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/"><Name>{}</Name><Prefix>{}</Prefix><KeyCount>{}</KeyCount><MaxKeys>1000</MaxKeys><IsTruncated>false</IsTruncated>{}</ListBucketResult>"#,
        BUCKET,
        prefix,
        keys.len(),
        contents
    )
}

async fn mount_listing(server: &MockServer, prefix: &str, keys: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", BUCKET)))
        .and(query_param("list-type", "2"))
        .and(query_param("prefix", prefix))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/xml")
                .set_body_string(listing(prefix, keys)),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_put(server: &MockServer, key: &str, expected: u64) {
    Mock::given(method("PUT"))
        .and(path(format!("/{}/{}", BUCKET, key)))
        .respond_with(ResponseTemplate::new(200).insert_header("etag", "\"abc\""))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_delete(server: &MockServer, key: &str, expected: u64) {
    Mock::given(method("DELETE"))
        .and(path(format!("/{}/{}", BUCKET, key)))
        .respond_with(ResponseTemplate::new(204))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_prefix_neighbour_is_not_deleted() {
    let server = MockServer::start().await;
    mount_listing(&server, "1.md", &["1.md.bak", "1.mdx"]).await;
    mount_delete(&server, "1.md", 0).await;
    mount_put(&server, "1.md", 1).await;

    let client = ObjectStorageClient::connect(&snapshot(&server)).unwrap();
    let report = client.publish(BUCKET, &ContentId::from(1), "## one").await.unwrap();

    assert_eq!(report.key, "1.md");
    assert!(!report.replaced);
}

#[tokio::test]
async fn test_existing_key_is_deleted_then_put() {
    let server = MockServer::start().await;
    mount_listing(&server, "42.md", &["42.md"]).await;
    mount_delete(&server, "42.md", 1).await;
    mount_put(&server, "42.md", 1).await;

    let client = ObjectStorageClient::connect(&snapshot(&server)).unwrap();
    let report = client.publish(BUCKET, &ContentId::from(42), "## bye").await.unwrap();

    assert!(report.replaced);
}

#[tokio::test]
async fn test_list_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{}", BUCKET)))
        .respond_with(
            ResponseTemplate::new(500)
                .insert_header("content-type", "application/xml")
                .set_body_string(
                    "<Error><Code>InternalError</Code><Message>boom</Message></Error>",
                ),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_put(&server, "3.md", 0).await;

    let client = ObjectStorageClient::connect(&snapshot(&server)).unwrap();
    let err = client.publish(BUCKET, &ContentId::from(3), "x").await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::Storage {
            step: PublishStep::List,
            ..
        }
    ));
}
