//! Reqwest-backed Cloudinary adapter.
//!
//! Speaks the signed REST upload API: every call carries `api_key`,
//! `timestamp` and a SHA-1 `signature` over the sorted parameters.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, multipart};
use serde::Deserialize;
use sha1::{Digest, Sha1};

use super::{MediaHost, MediaHostError, UploadedAsset};
use crate::config::CloudinaryConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CloudinaryClient {
    client: Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryClient {
    pub fn new(config: &CloudinaryConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base, self.cloud_name, action)
    }
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> Result<UploadedAsset, MediaHostError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(bytes).file_name("upload"))
            .text("folder", folder.to_string())
            .text("timestamp", timestamp)
            .text("api_key", self.api_key.clone())
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(MediaHostError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let decoded: UploadResponse = serde_json::from_slice(&body)
            .map_err(|err| MediaHostError::Decode(format!("invalid upload payload: {err}")))?;
        Ok(UploadedAsset {
            public_id: decoded.public_id,
            secure_url: decoded.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), MediaHostError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.api_secret,
        );

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&[
                ("public_id", public_id),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(MediaHostError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let decoded: DestroyResponse = serde_json::from_slice(&body)
            .map_err(|err| MediaHostError::Decode(format!("invalid destroy payload: {err}")))?;
        // "not found" means the asset is already gone.
        match decoded.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(MediaHostError::Decode(format!("destroy result: {other}"))),
        }
    }
}

/// `key=value` pairs sorted by key and joined with `&`.
fn string_to_sign(params: &[(&str, &str)]) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_are_sorted_before_signing() {
        let joined = string_to_sign(&[("timestamp", "1315060510"), ("public_id", "sample")]);
        assert_eq!(joined, "public_id=sample&timestamp=1315060510");
    }

    #[test]
    fn signature_is_hex_sha1_and_depends_on_secret() {
        let params = [("folder", "mk-toasted-demo"), ("timestamp", "1700000000")];
        let first = sign(&params, "secret-a");
        let second = sign(&params, "secret-b");

        assert_eq!(first.len(), 40);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
        assert_eq!(first, sign(&params, "secret-a"));
    }

    #[test]
    fn signature_matches_published_example() {
        let params = [("timestamp", "1315060510"), ("public_id", "sample_image")];
        assert_eq!(
            sign(&params, "abcd"),
            "b4ad47fb4e25c7bf5f92a20089f9db59bc302313"
        );
    }

    #[test]
    fn endpoint_joins_cloud_and_action() {
        let config = CloudinaryConfig {
            api_base: "https://api.cloudinary.com/v1_1/".into(),
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            folder: "mk-toasted-demo".into(),
        };
        let client = CloudinaryClient::new(&config).expect("client");
        assert_eq!(
            client.endpoint("upload"),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }
}
