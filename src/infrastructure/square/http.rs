//! # HTTP Transport
//!
//! Low-level requests to the Square Cloud API. Responses arrive in a
//! `{status, code, response}` envelope; this module unwraps the envelope and
//! maps status codes onto [`SquareError`]. The typed layer lives in
//! [`super::client`].

use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::archive::File;
use super::error::SquareError;

/// Production API endpoint.
pub const BASE_URL: &str = "https://api.squarecloud.app/v2";

/// HTTP client reused across requests. Some routes (upload, backup) take a
/// while to respond, hence the generous timeout.
fn http_client() -> &'static reqwest::Client {
    use std::sync::OnceLock;
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("failed to create HTTP client")
    })
}

/// Response envelope used by every API route.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    response: Option<Value>,
}

/// Unwrap an envelope according to the HTTP status code.
fn interpret(status: StatusCode, envelope: Option<Envelope>) -> Result<Value, SquareError> {
    if status.is_success() {
        return Ok(envelope
            .and_then(|e| e.response)
            .unwrap_or(Value::Null));
    }

    let code = envelope
        .and_then(|e| e.code)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("UNKNOWN").to_string());

    Err(match status.as_u16() {
        401 => SquareError::AuthenticationFailure { code },
        404 => SquareError::NotFound { code },
        s => SquareError::Http { status: s, code },
    })
}

/// Raw HTTP client for the Square Cloud API.
///
/// The API key may be absent; public routes like the service statistics work
/// without one.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    api_key: Option<String>,
}

impl HttpClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| BASE_URL.to_string()),
            api_key,
        }
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        form: Option<Form>,
    ) -> Result<Value, SquareError> {
        let url = format!("{}{path}", self.base_url);

        let mut request = http_client().request(method.clone(), &url);

        if let Some(api_key) = &self.api_key {
            request = request.header(reqwest::header::AUTHORIZATION, api_key);
        }

        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request.send().await?;
        let status = response.status();
        let envelope: Option<Envelope> = response.json().await.ok();

        tracing::debug!("{method} {url} returned {status}");

        let result = interpret(status, envelope);
        if let Err(err) = &result {
            tracing::warn!("Error in {method} {url}: {err}");
        }
        result
    }

    // Service

    pub async fn service_statistics(&self) -> Result<Value, SquareError> {
        self.request(Method::GET, "/service/statistics", None).await
    }

    // User

    pub async fn me(&self) -> Result<Value, SquareError> {
        self.request(Method::GET, "/user", None).await
    }

    // Applications

    pub async fn get_app(&self, id: &str) -> Result<Value, SquareError> {
        self.request(Method::GET, &format!("/apps/{id}"), None).await
    }

    pub async fn get_app_status(&self, id: &str) -> Result<Value, SquareError> {
        self.request(Method::GET, &format!("/apps/{id}/status"), None)
            .await
    }

    pub async fn get_all_apps_status(&self) -> Result<Value, SquareError> {
        self.request(Method::GET, "/apps/all/status", None).await
    }

    pub async fn get_app_logs(&self, id: &str) -> Result<Value, SquareError> {
        self.request(Method::GET, &format!("/apps/{id}/logs"), None)
            .await
    }

    pub async fn start_app(&self, id: &str) -> Result<Value, SquareError> {
        self.request(Method::POST, &format!("/apps/{id}/start"), None)
            .await
    }

    pub async fn restart_app(&self, id: &str) -> Result<Value, SquareError> {
        self.request(Method::POST, &format!("/apps/{id}/restart"), None)
            .await
    }

    pub async fn stop_app(&self, id: &str) -> Result<Value, SquareError> {
        self.request(Method::POST, &format!("/apps/{id}/stop"), None)
            .await
    }

    pub async fn backup(&self, id: &str) -> Result<Value, SquareError> {
        self.request(Method::GET, &format!("/apps/{id}/backup"), None)
            .await
    }

    pub async fn delete_app(&self, id: &str) -> Result<Value, SquareError> {
        self.request(Method::DELETE, &format!("/apps/{id}"), None)
            .await
    }

    pub async fn upload(&self, file: &File) -> Result<Value, SquareError> {
        self.request(Method::POST, "/apps/upload", Some(multipart(file)))
            .await
    }

    pub async fn commit(&self, id: &str, file: &File, restart: bool) -> Result<Value, SquareError> {
        self.request(
            Method::POST,
            &format!("/apps/{id}/commit?restart={restart}"),
            Some(multipart(file)),
        )
        .await
    }
}

fn multipart(file: &File) -> Form {
    let part = Part::bytes(file.bytes.to_vec()).file_name(file.filename.clone());
    Form::new().part("file", part)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> Option<Envelope> {
        serde_json::from_str(json).ok()
    }

    #[test]
    fn success_unwraps_response_field() {
        let value = interpret(
            StatusCode::OK,
            envelope(r#"{"status":"success","response":{"id":"abc"}}"#),
        )
        .unwrap();
        assert_eq!(value["id"], "abc");
    }

    #[test]
    fn success_without_body_is_null() {
        let value = interpret(StatusCode::NO_CONTENT, None).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn unauthorized_maps_to_authentication_failure() {
        let err = interpret(
            StatusCode::UNAUTHORIZED,
            envelope(r#"{"status":"error","code":"ACCESS_DENIED"}"#),
        )
        .unwrap_err();
        assert!(err.is_authentication_failure());
        assert_eq!(err.code(), Some("ACCESS_DENIED"));
    }

    #[test]
    fn not_found_maps_to_not_found() {
        let err = interpret(
            StatusCode::NOT_FOUND,
            envelope(r#"{"status":"error","code":"APP_NOT_FOUND"}"#),
        )
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn other_errors_keep_status_and_code() {
        let err = interpret(
            StatusCode::BAD_REQUEST,
            envelope(r#"{"status":"error","code":"INVALID_BUFFER"}"#),
        )
        .unwrap_err();
        match err {
            SquareError::Http { status, code } => {
                assert_eq!(status, 400);
                assert_eq!(code, "INVALID_BUFFER");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_error_body_falls_back_to_reason() {
        let err = interpret(StatusCode::BAD_GATEWAY, None).unwrap_err();
        assert_eq!(err.code(), Some("Bad Gateway"));
    }
}
