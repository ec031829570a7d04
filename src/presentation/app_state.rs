// Application state for HTTP handlers
use crate::application::workflow_service::WorkflowService;

#[derive(Clone)]
pub struct AppState {
    pub workflow: WorkflowService,
}
