//! Request plumbing shared by the service clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{VisionError, VisionResult};

pub const OCTET_STREAM: &str = "application/octet-stream";

pub fn build_client(timeout: Duration) -> VisionResult<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Send a request and fail with [`VisionError::Remote`] on any non-success status.
pub async fn send(request: RequestBuilder) -> VisionResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    debug!("{} {}", status.as_u16(), response.url().path());

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(VisionError::remote(status.as_u16(), error_message(&body)))
}

/// Send a request and decode its JSON body.
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> VisionResult<T> {
    Ok(send(request).await?.json().await?)
}

/// Azure services wrap failures as `{"error": {"code", "message"}}`; fall back
/// to the raw body for anything else.
fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(serde::Deserialize)]
    struct Detail {
        #[serde(default)]
        code: Option<String>,
        message: String,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(Envelope {
            error: Detail {
                code: Some(code),
                message,
            },
        }) => format!("{code}: {message}"),
        Ok(Envelope { error }) => error.message,
        Err(_) => body.trim().to_string(),
    }
}
