//! Kargo API client (Connect protocol, JSON encoding)
//!
//! Every RPC is an HTTP POST to `{base}/{service}/{method}` with a JSON
//! body. Failures come back as non-2xx responses carrying `{code, message}`.

use super::template_service::TemplateService;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::{ClusterAnalysisTemplate, TemplateManifest};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "akuity.io.kargo.service.v1alpha1.KargoService";

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
struct NameRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct ManifestRequest {
    /// `bytes` fields are base64 in the proto3 JSON mapping
    manifest: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    cluster_analysis_templates: Vec<ClusterAnalysisTemplate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetResponse {
    cluster_analysis_template: Option<ClusterAnalysisTemplate>,
}

#[derive(Deserialize)]
struct DeleteResponse {}

#[derive(Deserialize)]
struct ResourceResponse {
    #[serde(default)]
    results: Vec<ResourceResult>,
}

#[derive(Deserialize)]
struct ResourceResult {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ConnectErrorBody {
    code: String,
    #[serde(default)]
    message: String,
}

pub struct KargoClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl KargoClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}/{}", self.base_url, SERVICE, method)
    }

    fn call<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        method: &str,
        request: &Req,
    ) -> Result<Resp, ApiError> {
        let mut builder = self
            .http
            .post(self.method_url(method))
            .header("Connect-Protocol-Version", "1")
            .json(request);
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(method, "calling Kargo API");
        let response = builder
            .send()
            .map_err(|e| ApiError::TransientNetwork(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ApiError::TransientNetwork(e.to_string()))?;

        if !status.is_success() {
            let err = decode_error(status.as_u16(), &body);
            tracing::warn!(method, status = status.as_u16(), error = %err, "Kargo API call failed");
            return Err(err);
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::Unexpected(format!("{} response: {}", method, e)))
    }

    fn submit_manifest(&self, method: &str, manifest: &str) -> Result<String, ApiError> {
        // Local validation first; invalid manifests are never sent
        let parsed = TemplateManifest::parse(manifest, None)?;

        let request = ManifestRequest {
            manifest: BASE64.encode(manifest.as_bytes()),
        };
        let response: ResourceResponse = self.call(method, &request)?;
        first_result_error(&response).map_or(Ok(parsed.name().to_string()), Err)
    }
}

/// Interpret a failed response body
fn decode_error(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ConnectErrorBody>(body) {
        Ok(err) => ApiError::from_connect_code(&err.code, err.message),
        Err(_) => ApiError::from_http_status(status, body.trim()),
    }
}

/// Create/Update report per-resource failures inside a 200 response
fn first_result_error(response: &ResourceResponse) -> Option<ApiError> {
    response
        .results
        .iter()
        .find_map(|r| r.error.as_ref())
        .map(|e| ApiError::Validation(e.clone()))
}

impl TemplateService for KargoClient {
    fn list_templates(&self) -> Result<Vec<ClusterAnalysisTemplate>, ApiError> {
        let response: ListResponse = self.call("ListClusterAnalysisTemplates", &Empty {})?;
        Ok(response.cluster_analysis_templates)
    }

    fn get_template(&self, name: &str) -> Result<ClusterAnalysisTemplate, ApiError> {
        let response: GetResponse =
            self.call("GetClusterAnalysisTemplate", &NameRequest { name })?;
        response
            .cluster_analysis_template
            .ok_or_else(|| ApiError::NotFound(format!("ClusterAnalysisTemplate '{}'", name)))
    }

    fn delete_template(&self, name: &str) -> Result<(), ApiError> {
        let _: DeleteResponse = self.call("DeleteClusterAnalysisTemplate", &NameRequest { name })?;
        Ok(())
    }

    fn create_template(&self, manifest: &str) -> Result<String, ApiError> {
        self.submit_manifest("CreateResource", manifest)
    }

    fn update_template(&self, manifest: &str) -> Result<String, ApiError> {
        self.submit_manifest("UpdateResource", manifest)
    }
}
