//! Signing endpoint integration tests.

#[cfg(test)]
mod tests {
    use crate::{http_client, upload_settings, url};

    async fn sign(
        client: &reqwest::Client,
        query: &str,
        body: &serde_json::Value,
    ) -> (reqwest::StatusCode, serde_json::Value) {
        let resp = client
            .post(url(&format!("/s3/signature{query}")))
            .json(body)
            .send()
            .await
            .expect("POST /s3/signature");
        let status = resp.status();
        (status, resp.json().await.expect("signature JSON"))
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_sign_v2_rest_request_for_configured_bucket() {
        let client = http_client();
        let settings = upload_settings(&client).await;
        let bucket = settings["bucket"].as_str().expect("bucket");

        let headers = format!(
            "POST\n\n\n\nx-amz-date:Tue, 27 Mar 2007 19:36:42 +0000\n/{bucket}/photos/a.png?uploads"
        );
        let (status, body) = sign(&client, "", &serde_json::json!({ "headers": headers })).await;
        assert_eq!(status, reqwest::StatusCode::OK);
        assert_eq!(body["signature"].as_str().expect("signature").len(), 28);
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_v2_rest_request_for_other_bucket() {
        let client = http_client();
        let headers = "PUT\n\n\n\nx-amz-date:Tue, 27 Mar 2007 19:36:42 +0000\n/not-the-upload-bucket-9f1c/key123";

        let (status, body) = sign(&client, "", &serde_json::json!({ "headers": headers })).await;
        assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
        assert_eq!(body["invalid"], true);
        assert!(body.get("signature").is_none());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_malformed_v4_rest_request() {
        let client = http_client();
        let (status, body) = sign(
            &client,
            "?v4=true",
            &serde_json::json!({ "headers": "PUT\n\n\n/uploads/key123" }),
        )
        .await;
        assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "MalformedHeaders");
        assert!(body.get("signature").is_none());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_reject_policy_for_other_bucket() {
        let client = http_client();
        let policy = serde_json::json!({
            "expiration": "2030-01-01T00:00:00.000Z",
            "conditions": [
                {"acl": "private"},
                {"bucket": "not-the-upload-bucket-9f1c"},
                {"x-amz-credential": "AKIDEXAMPLE/20130524/us-east-1/s3/aws4_request"}
            ]
        });

        let (status, body) = sign(&client, "?v4=true", &policy).await;
        assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
        assert_eq!(body["invalid"], true);
        assert!(body.get("policy").is_none());
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_sign_policy_for_configured_bucket() {
        let client = http_client();
        let settings = upload_settings(&client).await;
        let bucket = settings["bucket"].as_str().expect("bucket");

        let mut conditions = vec![
            serde_json::json!({"acl": "private"}),
            serde_json::json!({"bucket": bucket}),
        ];
        if let (Ok(min), Ok(max)) = (
            std::env::var("UPLOAD_MIN_SIZE"),
            std::env::var("UPLOAD_MAX_SIZE"),
        ) {
            conditions.push(serde_json::json!(["content-length-range", min, max]));
        }
        let policy = serde_json::json!({
            "expiration": "2030-01-01T00:00:00.000Z",
            "conditions": conditions,
        });

        let (status, body) = sign(&client, "", &policy).await;
        assert_eq!(status, reqwest::StatusCode::OK, "unexpected body {body}");
        assert!(body["policy"].is_string());
        assert!(body["signature"].is_string());
    }
}
