//! External service interactions
//!
//! This module contains services for talking to the template API:
//! - The `TemplateService` contract
//! - The Kargo Connect client and an in-memory implementation
//! - Background request execution

pub mod kargo_client;
pub mod memory;
pub mod request_runner;
pub mod template_service;

pub use kargo_client::KargoClient;
pub use memory::InMemoryTemplates;
pub use request_runner::{ApiRequest, ApiResponse, Completion, RequestRunner};
pub use template_service::TemplateService;
