use comments_shared::TaskId;

use crate::panel::CommentPanel;
use crate::sync::CommentRequest;

/// Task shown when the host does not name one
pub const DEFAULT_TASK_ID: &str = "1";

/// Hosts the comment panel for one task at a time
pub struct TaskDetailView {
    pub panel: CommentPanel,
}

impl TaskDetailView {
    /// Build the view from whatever task id the host resolved, if any
    pub fn resolve(task_id: Option<&str>) -> Self {
        let task_id = task_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_TASK_ID);
        Self {
            panel: CommentPanel::new(TaskId::from(task_id)),
        }
    }

    pub fn task_id(&self) -> &TaskId {
        self.panel.task_id()
    }

    /// First load, issued when the view is shown
    pub fn mount(&mut self) -> CommentRequest {
        self.panel.begin_load()
    }

    /// Switch to another task; returns the reload request if it changed
    pub fn navigate(&mut self, task_id: &str) -> Option<CommentRequest> {
        let task_id = task_id.trim();
        if task_id.is_empty() {
            return None;
        }
        self.panel.set_task(TaskId::from(task_id))
    }
}
