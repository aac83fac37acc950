//! In-memory template service
//!
//! Backs the `--demo` mode and the tests. Behaves like the server for the
//! cases the screen cares about: ordered listing, `NotFound` on missing
//! names, `Validation` on duplicate creates.

use super::template_service::TemplateService;
use crate::error::ApiError;
use crate::model::template::DESCRIPTION_ANNOTATION;
use crate::model::{ClusterAnalysisTemplate, ObjectMeta, TemplateManifest, Time};
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryTemplates {
    items: Mutex<Vec<ClusterAnalysisTemplate>>,
}

impl InMemoryTemplates {
    pub fn new(items: Vec<ClusterAnalysisTemplate>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// A handful of realistic templates for the demo mode
    pub fn seeded() -> Self {
        let now = Utc::now();
        let sample = |name: &str, days_ago: i64, description: Option<&str>, query: &str| {
            let mut meta = ObjectMeta {
                name: Some(name.to_string()),
                creation_timestamp: Some(Time::from_datetime(now - Duration::days(days_ago))),
                ..Default::default()
            };
            if let Some(description) = description {
                meta.annotations
                    .insert(DESCRIPTION_ANNOTATION.to_string(), description.to_string());
            }
            ClusterAnalysisTemplate {
                metadata: Some(meta),
                spec: json!({
                    "metrics": [{
                        "name": name,
                        "interval": "1m",
                        "successCondition": "result[0] >= 0.95",
                        "provider": {
                            "prometheus": {
                                "address": "http://prometheus.monitoring:9090",
                                "query": query
                            }
                        }
                    }]
                }),
            }
        };

        Self::new(vec![
            sample(
                "success-rate",
                30,
                Some("Ratio of non-5xx responses over the last five minutes"),
                "sum(rate(http_requests_total{code!~\"5..\"}[5m])) / sum(rate(http_requests_total[5m]))",
            ),
            sample(
                "p99-latency",
                12,
                Some("Fails when p99 latency exceeds 500ms"),
                "histogram_quantile(0.99, sum(rate(http_request_duration_seconds_bucket[5m])) by (le))",
            ),
            sample("smoke-test", 2, None, "up"),
        ])
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ClusterAnalysisTemplate>>, ApiError> {
        self.items
            .lock()
            .map_err(|_| ApiError::Unexpected("template store poisoned".to_string()))
    }
}

impl TemplateService for InMemoryTemplates {
    fn list_templates(&self) -> Result<Vec<ClusterAnalysisTemplate>, ApiError> {
        Ok(self.lock()?.clone())
    }

    fn get_template(&self, name: &str) -> Result<ClusterAnalysisTemplate, ApiError> {
        self.lock()?
            .iter()
            .find(|t| t.name() == Some(name))
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("ClusterAnalysisTemplate '{}'", name)))
    }

    fn delete_template(&self, name: &str) -> Result<(), ApiError> {
        let mut items = self.lock()?;
        let index = items
            .iter()
            .position(|t| t.name() == Some(name))
            .ok_or_else(|| ApiError::NotFound(format!("ClusterAnalysisTemplate '{}'", name)))?;
        items.remove(index);
        Ok(())
    }

    fn create_template(&self, manifest: &str) -> Result<String, ApiError> {
        let manifest = TemplateManifest::parse(manifest, None)?;
        let mut items = self.lock()?;
        if items.iter().any(|t| t.name() == Some(manifest.name())) {
            return Err(ApiError::Validation(format!(
                "ClusterAnalysisTemplate '{}' already exists",
                manifest.name()
            )));
        }
        let name = manifest.name().to_string();
        items.push(manifest.into_template(Some(Time::from_datetime(Utc::now()))));
        Ok(name)
    }

    fn update_template(&self, manifest: &str) -> Result<String, ApiError> {
        let manifest = TemplateManifest::parse(manifest, None)?;
        let mut items = self.lock()?;
        let slot = items
            .iter_mut()
            .find(|t| t.name() == Some(manifest.name()))
            .ok_or_else(|| {
                ApiError::NotFound(format!("ClusterAnalysisTemplate '{}'", manifest.name()))
            })?;
        let name = manifest.name().to_string();
        let created = slot.creation_timestamp();
        *slot = manifest.into_template(created);
        Ok(name)
    }
}
