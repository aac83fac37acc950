//! Contract of the remote template API
//!
//! Calls are blocking; the request runner executes them on worker threads so
//! the UI loop never waits on the network.

use crate::error::ApiError;
use crate::model::ClusterAnalysisTemplate;

pub trait TemplateService: Send + Sync {
    /// Full collection, in server order
    fn list_templates(&self) -> Result<Vec<ClusterAnalysisTemplate>, ApiError>;

    /// Single template by name
    fn get_template(&self, name: &str) -> Result<ClusterAnalysisTemplate, ApiError>;

    /// Delete by name; `NotFound` if it does not exist
    fn delete_template(&self, name: &str) -> Result<(), ApiError>;

    /// Create from a YAML manifest, returning the created name
    fn create_template(&self, manifest: &str) -> Result<String, ApiError>;

    /// Replace an existing template from a YAML manifest, returning its name
    fn update_template(&self, manifest: &str) -> Result<String, ApiError>;
}
