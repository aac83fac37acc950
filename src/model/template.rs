//! Cluster analysis template records as returned by the Kargo API
//!
//! Field names follow the proto3 JSON mapping used by the Connect protocol
//! (camelCase, int64 encoded as strings).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Annotation holding the human-readable description of a resource
pub const DESCRIPTION_ANNOTATION: &str = "kargo.akuity.io/description";

/// Structured Kubernetes timestamp (`metav1.Time` as seen over Connect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Time {
    #[serde(serialize_with = "serialize_int64")]
    pub seconds: i64,
    pub nanos: i32,
}

impl Time {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos() as i32,
        }
    }

    /// Convert to a calendar time; `None` when the value is out of range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let nanos = u32::try_from(self.nanos).ok()?;
        DateTime::from_timestamp(self.seconds, nanos)
    }
}

fn serialize_int64<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Int64Repr {
    Number(i64),
    Text(String),
}

fn deserialize_int64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Int64Repr::deserialize(deserializer)? {
        Int64Repr::Number(n) => Ok(n),
        Int64Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeRepr {
    Structured {
        #[serde(default, deserialize_with = "deserialize_int64")]
        seconds: i64,
        #[serde(default)]
        nanos: i32,
    },
    // Plain Kubernetes JSON uses RFC 3339 strings
    Rfc3339(String),
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TimeRepr::deserialize(deserializer)? {
            TimeRepr::Structured { seconds, nanos } => Ok(Time { seconds, nanos }),
            TimeRepr::Rfc3339(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| Time::from_datetime(dt.with_timezone(&Utc)))
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Subset of Kubernetes object metadata this screen cares about
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<Time>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// A cluster-scoped Argo Rollouts analysis template
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClusterAnalysisTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ObjectMeta>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub spec: serde_json::Value,
}

impl ClusterAnalysisTemplate {
    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref()?.name.as_deref()
    }

    pub fn creation_timestamp(&self) -> Option<Time> {
        self.metadata.as_ref()?.creation_timestamp
    }

    /// Description annotation, if present and non-blank
    pub fn description(&self) -> Option<&str> {
        self.metadata
            .as_ref()?
            .annotations
            .get(DESCRIPTION_ANNOTATION)
            .map(|d| d.as_str())
            .filter(|d| !d.trim().is_empty())
    }
}
