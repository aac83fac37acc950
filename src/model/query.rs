//! Query and mutation bookkeeping
//!
//! The screen is a read-through cache: a `QueryState` remembers the last
//! successful payload, whether a fetch is in flight and the last error.
//! Each fetch is tagged with a `RequestId`; only the response to the most
//! recent request is applied, so late answers to superseded or abandoned
//! requests never overwrite newer state.

use crate::error::ApiError;
use std::fmt;

/// Identifier handed out by the request runner for every submitted request
pub type RequestId = u64;

/// Identity of a cached query, used for explicit invalidation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full template collection shown in the table
    ClusterAnalysisTemplates,
    /// One template, loaded by the edit modal
    ClusterAnalysisTemplate(String),
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::ClusterAnalysisTemplates => write!(f, "clusterAnalysisTemplates"),
            QueryKey::ClusterAnalysisTemplate(name) => write!(f, "clusterAnalysisTemplate/{}", name),
        }
    }
}

#[derive(Debug)]
pub struct QueryState<T> {
    pub key: QueryKey,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    in_flight: Option<RequestId>,
}

impl<T> QueryState<T> {
    pub fn new(key: QueryKey) -> Self {
        Self {
            key,
            data: None,
            error: None,
            in_flight: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Record a newly issued fetch; any earlier one is superseded
    pub fn begin(&mut self, id: RequestId) {
        self.in_flight = Some(id);
    }

    pub fn awaits(&self, id: RequestId) -> bool {
        self.in_flight == Some(id)
    }

    /// Apply a response. Returns `false` if the response was stale and ignored.
    pub fn settle(&mut self, id: RequestId, result: Result<T, ApiError>) -> bool {
        if !self.awaits(id) {
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => {
                // Keep previously fetched data visible alongside the error
                self.error = Some(err);
            }
        }
        true
    }

    /// Forget any in-flight request, e.g. when its consumer goes away
    pub fn abandon(&mut self) {
        self.in_flight = None;
    }
}

/// Pending/error state of a single mutation binding
#[derive(Debug, Default)]
pub struct MutationState {
    pub error: Option<ApiError>,
    in_flight: Option<RequestId>,
}

impl MutationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn begin(&mut self, id: RequestId) {
        self.in_flight = Some(id);
        self.error = None;
    }

    pub fn awaits(&self, id: RequestId) -> bool {
        self.in_flight == Some(id)
    }

    /// Settle the mutation; pending is cleared whatever the outcome.
    /// Returns `false` for a stale response.
    pub fn settle<T>(&mut self, id: RequestId, result: &Result<T, ApiError>) -> bool {
        if !self.awaits(id) {
            return false;
        }
        self.in_flight = None;
        self.error = result.as_ref().err().cloned();
        true
    }
}
