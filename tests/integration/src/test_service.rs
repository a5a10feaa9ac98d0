//! Health, config, and blank page integration tests.

#[cfg(test)]
mod tests {
    use crate::{http_client, upload_settings, url};

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_report_running() {
        let resp = http_client()
            .get(url("/health"))
            .send()
            .await
            .expect("GET /health");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert!(resp.headers().get("x-request-id").is_some());

        let body: serde_json::Value = resp.json().await.expect("health JSON");
        assert_eq!(body["status"], "running");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_expose_upload_settings() {
        let settings = upload_settings(&http_client()).await;
        let bucket = settings["bucket"].as_str().expect("bucket");
        assert!(!bucket.is_empty());
        assert!(
            settings["endpoint"]
                .as_str()
                .expect("endpoint")
                .starts_with("https://")
        );
        assert!(settings["accessKeyId"].is_string());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_serve_blank_page() {
        let resp = http_client()
            .get(url("/s3/blank"))
            .send()
            .await
            .expect("GET /s3/blank");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        assert_eq!(resp.text().await.expect("text"), "<html><body></body></html>");
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_not_expose_presigned_urls() {
        let resp = http_client()
            .get(url("/s3/presign?key=photos/a.png&method=PUT"))
            .send()
            .await
            .expect("GET /s3/presign");
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_return_not_found_for_unknown_path() {
        let resp = http_client()
            .get(url("/s3/unknown"))
            .send()
            .await
            .expect("GET /s3/unknown");
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    }
}
