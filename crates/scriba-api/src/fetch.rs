//! Remote artifact fetching.

use std::path::Path;

use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Stream a remote file to the given path.
///
/// A non-success response is a client error: nothing is written and the
/// submission must be rejected before any task is enqueued.
pub async fn fetch_to_file(client: &reqwest::Client, url: &str, path: &Path) -> ApiResult<()> {
    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to download file: {e}")))?;

    if !response.status().is_success() {
        return Err(ApiError::bad_request(format!(
            "Failed to download file: {} returned {}",
            url,
            response.status()
        )));
    }

    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to persist artifact: {e}")))?;

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to download file: {e}")))?
    {
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to persist artifact: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to persist artifact: {e}")))?;

    debug!(url, path = %path.display(), "Fetched remote artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn non_success_status_is_a_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.mp3"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("artifact");
        let client = reqwest::Client::new();

        let err = fetch_to_file(&client, &format!("{}/missing.mp3", server.uri()), &target)
            .await
            .expect_err("404 must be rejected");

        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn success_streams_body_to_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/talk.mp3"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("artifact");
        let client = reqwest::Client::new();

        fetch_to_file(&client, &format!("{}/talk.mp3", server.uri()), &target)
            .await
            .expect("fetch succeeds");

        let bytes = tokio::fs::read(&target).await.expect("read back");
        assert_eq!(bytes, b"audio bytes");
    }
}
