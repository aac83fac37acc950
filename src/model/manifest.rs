//! YAML manifests exchanged with the create/edit modals

use super::template::{ClusterAnalysisTemplate, ObjectMeta, Time};
use crate::error::ApiError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const API_VERSION: &str = "argoproj.io/v1alpha1";
pub const KIND: &str = "ClusterAnalysisTemplate";

/// DNS-1123 subdomain, the naming rule for cluster-scoped resources
static RESOURCE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").unwrap()
});

const MAX_NAME_LEN: usize = 253;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ManifestMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Kubernetes-style manifest of a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateManifest {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ManifestMetadata,
    #[serde(default)]
    pub spec: serde_json::Value,
}

impl TemplateManifest {
    /// Starting point for a new template
    pub fn skeleton() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata::default(),
            spec: json!({
                "metrics": [{
                    "name": "example",
                    "provider": {
                        "job": {
                            "spec": {
                                "backoffLimit": 1,
                                "template": {
                                    "spec": {
                                        "containers": [{
                                            "name": "check",
                                            "image": "alpine:latest",
                                            "command": ["sh", "-c", "exit 0"]
                                        }],
                                        "restartPolicy": "Never"
                                    }
                                }
                            }
                        }
                    }
                }]
            }),
        }
    }

    /// Manifest of an existing template; server-owned fields are dropped
    pub fn from_template(template: &ClusterAnalysisTemplate) -> Self {
        let meta = template.metadata.clone().unwrap_or_default();
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: meta.name.unwrap_or_default(),
                annotations: meta.annotations,
                labels: meta.labels,
            },
            spec: template.spec.clone(),
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Parse and validate manifest text
    ///
    /// `expected_name` pins the identity when editing an existing template.
    pub fn parse(text: &str, expected_name: Option<&str>) -> Result<Self, ApiError> {
        if text.trim().is_empty() {
            return Err(ApiError::Validation("manifest is empty".to_string()));
        }

        let manifest: TemplateManifest = serde_yaml::from_str(text)
            .map_err(|e| ApiError::Validation(format!("manifest is not valid YAML: {}", e)))?;

        manifest.validate(expected_name)?;
        Ok(manifest)
    }

    pub fn validate(&self, expected_name: Option<&str>) -> Result<(), ApiError> {
        if self.kind != KIND {
            return Err(ApiError::Validation(format!(
                "kind must be {}, found '{}'",
                KIND, self.kind
            )));
        }

        let name = self.metadata.name.as_str();
        if name.is_empty() {
            return Err(ApiError::Validation("metadata.name is required".to_string()));
        }
        if name.len() > MAX_NAME_LEN || !RESOURCE_NAME_REGEX.is_match(name) {
            return Err(ApiError::Validation(format!(
                "'{}' is not a valid resource name (lowercase alphanumerics, '-' and '.')",
                name
            )));
        }

        if let Some(expected) = expected_name {
            if name != expected {
                return Err(ApiError::Validation(format!(
                    "metadata.name cannot change while editing (expected '{}', found '{}')",
                    expected, name
                )));
            }
        }

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Build the stored record, stamping the given creation time
    pub fn into_template(self, created: Option<Time>) -> ClusterAnalysisTemplate {
        ClusterAnalysisTemplate {
            metadata: Some(ObjectMeta {
                name: Some(self.metadata.name),
                creation_timestamp: created,
                annotations: self.metadata.annotations,
                labels: self.metadata.labels,
            }),
            spec: self.spec,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::DESCRIPTION_ANNOTATION;

    const VALID: &str = r#"
apiVersion: argoproj.io/v1alpha1
kind: ClusterAnalysisTemplate
metadata:
  name: error-rate
  annotations:
    kargo.akuity.io/description: Fails when error rate exceeds 1%
spec:
  metrics:
  - name: errors
"#;

    #[test]
    fn test_parse_valid_manifest() {
        let manifest = TemplateManifest::parse(VALID, None).unwrap();
        assert_eq!(manifest.name(), "error-rate");
        assert_eq!(
            manifest.metadata.annotations.get(DESCRIPTION_ANNOTATION).map(String::as_str),
            Some("Fails when error rate exceeds 1%")
        );
        assert_eq!(manifest.spec["metrics"][0]["name"], "errors");
    }

    #[test]
    fn test_rejects_wrong_kind() {
        let text = VALID.replace("ClusterAnalysisTemplate", "AnalysisTemplate");
        let err = TemplateManifest::parse(&text, None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("kind")));
    }

    #[test]
    fn test_rejects_invalid_names() {
        for bad in ["", "Upper", "-leading", "trailing-", "has_underscore"] {
            let mut manifest = TemplateManifest::skeleton();
            manifest.metadata.name = bad.to_string();
            assert!(manifest.validate(None).is_err(), "accepted '{}'", bad);
        }
    }

    #[test]
    fn test_edit_cannot_rename() {
        let err = TemplateManifest::parse(VALID, Some("other-name")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("cannot change")));
        assert!(TemplateManifest::parse(VALID, Some("error-rate")).is_ok());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(TemplateManifest::parse("   ", None).is_err());
        assert!(TemplateManifest::parse("metadata: [unclosed", None).is_err());
    }

    #[test]
    fn test_yaml_from_template_drops_creation_timestamp() {
        let manifest = TemplateManifest::parse(VALID, None).unwrap();
        let template = manifest.into_template(Some(Time { seconds: 1, nanos: 0 }));

        let yaml = TemplateManifest::from_template(&template).to_yaml().unwrap();
        assert!(yaml.contains("name: error-rate"));
        assert!(!yaml.contains("creationTimestamp"));

        let reparsed = TemplateManifest::parse(&yaml, Some("error-rate")).unwrap();
        assert_eq!(reparsed.spec, template.spec);
    }

    #[test]
    fn test_skeleton_needs_a_name() {
        let yaml = TemplateManifest::skeleton().to_yaml().unwrap();
        let err = TemplateManifest::parse(&yaml, None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("metadata.name")));
    }
}
