//! Domain state - remote-backed data separate from UI concerns

use super::query::{MutationState, QueryKey, QueryState};
use super::template::ClusterAnalysisTemplate;

/// Domain state: the cached collection and the delete binding
pub struct DomainState {
    /// List query for the template collection
    pub templates: QueryState<Vec<ClusterAnalysisTemplate>>,

    /// Delete mutation (one at a time)
    pub delete: MutationState,
}

impl Default for DomainState {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainState {
    pub fn new() -> Self {
        Self {
            templates: QueryState::new(QueryKey::ClusterAnalysisTemplates),
            delete: MutationState::new(),
        }
    }

    /// Items currently known, empty until the first fetch succeeds
    pub fn items(&self) -> &[ClusterAnalysisTemplate] {
        self.templates.data.as_deref().unwrap_or(&[])
    }
}
