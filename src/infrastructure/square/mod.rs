//! # Square Cloud API
//!
//! Typed client for the Square Cloud REST API (`api.squarecloud.app/v2`):
//! HTTP transport with the `{status, code, response}` envelope, resource
//! models, the `squarecloud.config` parser, and zip archive validation for
//! uploads.

pub mod archive;
pub mod client;
pub mod config_file;
pub mod error;
pub mod http;
pub mod models;

pub use archive::{File, ValidationError};
pub use client::Client;
pub use config_file::ConfigFile;
pub use error::SquareError;
