//! Background request runner
//!
//! Each submitted request runs on its own worker thread against the shared
//! `TemplateService`; the outcome is sent back over a channel and drained on
//! the UI thread during ticks.

use super::template_service::TemplateService;
use crate::error::ApiError;
use crate::model::{ClusterAnalysisTemplate, RequestId};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// A remote operation to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    ListTemplates,
    GetTemplate { name: String },
    DeleteTemplate { name: String },
    CreateTemplate { manifest: String },
    UpdateTemplate { manifest: String },
}

impl ApiRequest {
    pub fn label(&self) -> &'static str {
        match self {
            ApiRequest::ListTemplates => "list",
            ApiRequest::GetTemplate { .. } => "get",
            ApiRequest::DeleteTemplate { .. } => "delete",
            ApiRequest::CreateTemplate { .. } => "create",
            ApiRequest::UpdateTemplate { .. } => "update",
        }
    }
}

/// Successful payload of an `ApiRequest`
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Templates(Vec<ClusterAnalysisTemplate>),
    Template(ClusterAnalysisTemplate),
    Deleted(String),
    Created(String),
    Updated(String),
}

/// A settled request
#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub request: ApiRequest,
    pub result: Result<ApiResponse, ApiError>,
    pub elapsed: Duration,
}

pub struct RequestRunner {
    service: Arc<dyn TemplateService>,
    sender: Sender<Completion>,
    receiver: Receiver<Completion>,
    next_id: RequestId,
    in_flight: usize,
}

impl RequestRunner {
    pub fn new(service: Arc<dyn TemplateService>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            service,
            sender,
            receiver,
            next_id: 1,
            in_flight: 0,
        }
    }

    /// Number of submitted requests whose completion has not been drained
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a request in the background
    pub fn submit(&mut self, request: ApiRequest) -> RequestId {
        let id = self.next_id;
        self.next_id += 1;
        self.in_flight += 1;

        tracing::debug!(id, request = request.label(), "submitting request");

        let service = Arc::clone(&self.service);
        let sender = self.sender.clone();
        thread::spawn(move || {
            let started = Instant::now();
            let result = Self::execute(service.as_ref(), &request);
            // The receiver is gone when the app has shut down; nothing to do then
            let _ = sender.send(Completion {
                id,
                request,
                result,
                elapsed: started.elapsed(),
            });
        });

        id
    }

    fn execute(service: &dyn TemplateService, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        match request {
            ApiRequest::ListTemplates => service.list_templates().map(ApiResponse::Templates),
            ApiRequest::GetTemplate { name } => service.get_template(name).map(ApiResponse::Template),
            ApiRequest::DeleteTemplate { name } => service
                .delete_template(name)
                .map(|()| ApiResponse::Deleted(name.clone())),
            ApiRequest::CreateTemplate { manifest } => {
                service.create_template(manifest).map(ApiResponse::Created)
            }
            ApiRequest::UpdateTemplate { manifest } => {
                service.update_template(manifest).map(ApiResponse::Updated)
            }
        }
    }

    /// Drain all completions that are ready without blocking
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut completions = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(completion) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    completions.push(completion);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        completions
    }

    /// Block until the next completion arrives or the timeout elapses
    #[cfg(test)]
    pub fn wait(&mut self, timeout: Duration) -> Option<Completion> {
        let completion = self.receiver.recv_timeout(timeout).ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryTemplates;

    #[test]
    fn test_submit_and_wait() {
        let mut runner = RequestRunner::new(Arc::new(InMemoryTemplates::seeded()));
        let id = runner.submit(ApiRequest::ListTemplates);
        assert_eq!(runner.in_flight(), 1);

        let completion = runner.wait(Duration::from_secs(5)).expect("completion");
        assert_eq!(completion.id, id);
        assert_eq!(runner.in_flight(), 0);
        match completion.result {
            Ok(ApiResponse::Templates(items)) => assert_eq!(items.len(), 3),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let mut runner = RequestRunner::new(Arc::new(InMemoryTemplates::default()));
        let a = runner.submit(ApiRequest::ListTemplates);
        let b = runner.submit(ApiRequest::ListTemplates);
        assert_ne!(a, b);
    }

    #[test]
    fn test_errors_are_delivered() {
        let mut runner = RequestRunner::new(Arc::new(InMemoryTemplates::default()));
        runner.submit(ApiRequest::DeleteTemplate {
            name: "missing".to_string(),
        });

        let completion = runner.wait(Duration::from_secs(5)).expect("completion");
        assert!(matches!(completion.result, Err(ApiError::NotFound(_))));
    }

    #[test]
    fn test_poll_drains_everything_ready() {
        let mut runner = RequestRunner::new(Arc::new(InMemoryTemplates::default()));
        runner.submit(ApiRequest::ListTemplates);
        runner.submit(ApiRequest::ListTemplates);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut seen = 0;
        while seen < 2 && Instant::now() < deadline {
            seen += runner.poll().len();
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(seen, 2);
        assert_eq!(runner.in_flight(), 0);
    }
}
