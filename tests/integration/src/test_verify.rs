//! Upload verification integration tests.

#[cfg(test)]
mod tests {
    use aws_sdk_s3::primitives::ByteStream;

    use crate::{http_client, s3_client, test_object_key, upload_settings, url};

    async fn put_object(bucket: &str, key: &str, size: usize) {
        let client = s3_client();
        let _ = client.create_bucket().bucket(bucket).send().await;
        client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("application/octet-stream")
            .body(ByteStream::from(vec![0_u8; size]))
            .send()
            .await
            .expect("put_object");
    }

    #[tokio::test]
    #[ignore = "requires running server and S3 endpoint"]
    async fn test_should_accept_small_upload() {
        let client = http_client();
        let settings = upload_settings(&client).await;
        let bucket = settings["bucket"].as_str().expect("bucket");
        let key = test_object_key("small");
        put_object(bucket, &key, 10).await;

        let resp = client
            .post(url("/s3/success"))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(format!("key={key}&name=a.bin"))
            .send()
            .await
            .expect("POST /s3/success");
        assert_eq!(resp.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = resp.json().await.expect("verify JSON");
        assert_eq!(body["accepted"], true);
        assert_eq!(body["size"], 10);
        assert_eq!(body["contentType"], "application/octet-stream");
        assert!(body["etag"].is_string());
    }

    #[tokio::test]
    #[ignore = "requires running server and S3 endpoint"]
    async fn test_should_delete_oversized_upload() {
        let Some(max_size) = std::env::var("UPLOAD_MAX_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        else {
            return;
        };
        let client = http_client();
        let settings = upload_settings(&client).await;
        let bucket = settings["bucket"].as_str().expect("bucket");
        let key = test_object_key("big");
        put_object(bucket, &key, max_size + 1).await;

        let resp = client
            .post(url("/s3/success"))
            .json(&serde_json::json!({ "key": key }))
            .send()
            .await
            .expect("POST /s3/success");
        assert_eq!(resp.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);

        let body: serde_json::Value = resp.json().await.expect("verify JSON");
        assert_eq!(body["accepted"], false);

        let head = s3_client().head_object().bucket(bucket).key(&key).send().await;
        assert!(head.is_err(), "oversized object should have been deleted");
    }

    #[tokio::test]
    #[ignore = "requires running server and S3 endpoint"]
    async fn test_should_report_missing_upload() {
        let client = http_client();
        let resp = client
            .post(url("/s3/success"))
            .json(&serde_json::json!({ "key": test_object_key("missing") }))
            .send()
            .await
            .expect("POST /s3/success");
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        let body: serde_json::Value = resp.json().await.expect("error JSON");
        assert_eq!(body["code"], "NotFound");
    }
}
