//! # Square Cloud Client
//!
//! Typed entry point for the Square Cloud API. One method per remote
//! operation; payload deserialization into the [`models`] types happens
//! here, on top of the raw [`HttpClient`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::archive::File;
use super::error::SquareError;
use super::http::HttpClient;
use super::models::{
    Application, ApplicationStatus, PartialApplication, PartialApplicationStatus,
    ServiceStatistics, UploadedApplication, User,
};

/// Client to interact with the Square Cloud API.
///
/// The API key may be absent, which is enough for the public routes
/// (service statistics).
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, SquareError> {
    serde_json::from_value(value).map_err(|e| SquareError::Decode(e.to_string()))
}

impl Client {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            http: HttpClient::new(api_key, base_url),
        }
    }

    // Public

    /// Statistics about the service.
    pub async fn service_statistics(&self) -> Result<ServiceStatistics, SquareError> {
        decode(self.http.service_statistics().await?)
    }

    // User

    /// Information about the authenticated account. Also the cheapest way
    /// to find out whether an API key is valid.
    pub async fn me(&self) -> Result<User, SquareError> {
        decode(self.http.me().await?)
    }

    /// All of the user's applications.
    pub async fn get_all_apps(&self) -> Result<Vec<PartialApplication>, SquareError> {
        Ok(self.me().await?.apps)
    }

    // Applications

    pub async fn get_app(&self, id: &str) -> Result<Application, SquareError> {
        decode(self.http.get_app(id).await?)
    }

    pub async fn get_app_status(&self, id: &str) -> Result<ApplicationStatus, SquareError> {
        decode(self.http.get_app_status(id).await?)
    }

    pub async fn get_all_apps_status(
        &self,
    ) -> Result<Vec<PartialApplicationStatus>, SquareError> {
        decode(self.http.get_all_apps_status().await?)
    }

    /// The application's latest logs.
    pub async fn get_app_logs(&self, id: &str) -> Result<String, SquareError> {
        let value = self.http.get_app_logs(id).await?;
        value
            .get("logs")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SquareError::Decode("logs payload has no 'logs' field".to_string()))
    }

    pub async fn start_app(&self, id: &str) -> Result<(), SquareError> {
        self.http.start_app(id).await.map(|_| ())
    }

    pub async fn restart_app(&self, id: &str) -> Result<(), SquareError> {
        self.http.restart_app(id).await.map(|_| ())
    }

    pub async fn stop_app(&self, id: &str) -> Result<(), SquareError> {
        self.http.stop_app(id).await.map(|_| ())
    }

    /// URL to download a backup of the application files.
    pub async fn get_backup_url(&self, id: &str) -> Result<String, SquareError> {
        let value = self.http.backup(id).await?;
        value
            .get("downloadURL")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                SquareError::Decode("backup payload has no 'downloadURL' field".to_string())
            })
    }

    /// Permanently delete an application. The caller is responsible for
    /// having confirmed this with the user first.
    pub async fn delete_app(&self, id: &str) -> Result<(), SquareError> {
        self.http.delete_app(id).await.map(|_| ())
    }

    /// Upload a new application archive.
    pub async fn upload(&self, file: &File) -> Result<UploadedApplication, SquareError> {
        decode(self.http.upload(file).await?)
    }

    /// Push a file update to an existing application, optionally restarting
    /// it afterwards.
    pub async fn commit(&self, id: &str, file: &File, restart: bool) -> Result<(), SquareError> {
        self.http.commit(id, file, restart).await.map(|_| ())
    }
}
