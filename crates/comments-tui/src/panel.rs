//! Comment list panel: the local copy of a task's comments and the rules
//! that keep it in step with the server.

use comments_shared::{Comment, CommentId, TaskId};

use crate::form::{CommentForm, FormSeed, ValidationError};
use crate::sync::{failure_message, failure_notice, CommentOutcome, CommentRequest, Operation};

/// Result of feeding an outcome back into the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// State now reflects the server's answer
    Applied,
    /// The outcome belongs to a task or load that is no longer current
    Discarded,
    /// A mutation failed; the message must be shown to the user
    Failed(String),
}

pub struct EditState {
    pub comment_id: CommentId,
    pub form: CommentForm,
}

pub struct CommentPanel {
    task_id: TaskId,
    comments: Vec<Comment>,
    loading: bool,
    error: Option<String>,
    create_form: CommentForm,
    edit: Option<EditState>,
    selected: usize,
    load_seq: u64,
}

impl CommentPanel {
    pub fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            comments: Vec::new(),
            loading: false,
            error: None,
            create_form: CommentForm::create(),
            edit: None,
            selected: 0,
            load_seq: 0,
        }
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn create_form(&self) -> &CommentForm {
        &self.create_form
    }

    pub fn create_form_mut(&mut self) -> &mut CommentForm {
        &mut self.create_form
    }

    /// Comment whose inline edit form is open, if any
    pub fn editing_id(&self) -> Option<&CommentId> {
        self.edit.as_ref().map(|e| &e.comment_id)
    }

    pub fn edit_form(&self) -> Option<&CommentForm> {
        self.edit.as_ref().map(|e| &e.form)
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut CommentForm> {
        self.edit.as_mut().map(|e| &mut e.form)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_comment(&self) -> Option<&Comment> {
        self.comments.get(self.selected)
    }

    pub fn select_next(&mut self) {
        if self.selected < self.comments.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Mark the panel as loading and build the list request.
    ///
    /// Each load gets a fresh sequence number; only the latest one is applied.
    pub fn begin_load(&mut self) -> CommentRequest {
        self.loading = true;
        self.error = None;
        self.load_seq += 1;
        CommentRequest::Load {
            task_id: self.task_id.clone(),
            seq: self.load_seq,
        }
    }

    /// Point the panel at another task. Returns the reload request if the
    /// task actually changed.
    pub fn set_task(&mut self, task_id: TaskId) -> Option<CommentRequest> {
        if task_id == self.task_id {
            return None;
        }
        tracing::info!(from = %self.task_id, to = %task_id, "switching task");
        self.task_id = task_id;
        self.edit = None;
        self.selected = 0;
        Some(self.begin_load())
    }

    pub fn submit_create(&mut self) -> Result<CommentRequest, ValidationError> {
        let payload = self.create_form.submit()?;
        Ok(CommentRequest::Create {
            task_id: self.task_id.clone(),
            payload,
        })
    }

    /// Open the inline edit form for `comment_id`, closing any other one.
    pub fn start_edit(&mut self, comment_id: &CommentId) -> bool {
        let Some(comment) = self.comments.iter().find(|c| &c.id == comment_id) else {
            return false;
        };
        self.edit = Some(EditState {
            comment_id: comment.id.clone(),
            form: CommentForm::edit(FormSeed::from(comment)),
        });
        true
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Validate the open edit form. `Ok(None)` when nothing is being edited.
    pub fn submit_edit(&mut self) -> Result<Option<CommentRequest>, ValidationError> {
        let Some(edit) = self.edit.as_mut() else {
            return Ok(None);
        };
        let payload = edit.form.submit()?;
        Ok(Some(CommentRequest::Update {
            task_id: self.task_id.clone(),
            comment_id: edit.comment_id.clone(),
            payload,
        }))
    }

    pub fn request_delete(&self, comment_id: &CommentId) -> Option<CommentRequest> {
        self.comments
            .iter()
            .any(|c| &c.id == comment_id)
            .then(|| CommentRequest::Delete {
                task_id: self.task_id.clone(),
                comment_id: comment_id.clone(),
            })
    }

    /// Fold a request outcome into local state.
    ///
    /// Successful results are applied only while their task (and, for loads,
    /// their sequence number) is still current. Mutation failures are always
    /// reported and never touch state.
    pub fn apply(&mut self, outcome: CommentOutcome) -> Applied {
        if outcome.task_id() != &self.task_id && !is_mutation_failure(&outcome) {
            tracing::debug!(
                task_id = %outcome.task_id(),
                current = %self.task_id,
                "discarding stale outcome"
            );
            return Applied::Discarded;
        }

        match outcome {
            CommentOutcome::Loaded { seq, result, .. } => {
                if seq != self.load_seq {
                    tracing::debug!(seq, latest = self.load_seq, "discarding superseded load");
                    return Applied::Discarded;
                }
                self.loading = false;
                match result {
                    Ok(comments) => {
                        tracing::info!(
                            task_id = %self.task_id,
                            count = comments.len(),
                            "comments loaded"
                        );
                        self.comments = comments;
                        self.clamp_selection();
                        self.resync_edit();
                    }
                    Err(e) => {
                        // Keep whatever was shown before
                        self.error = Some(failure_message(Operation::Load, &e));
                    }
                }
                Applied::Applied
            }
            CommentOutcome::Created { result, .. } => match result {
                Ok(comment) => {
                    self.comments.push(comment);
                    Applied::Applied
                }
                Err(e) => Applied::Failed(failure_notice(Operation::Create, &e)),
            },
            CommentOutcome::Updated {
                comment_id, result, ..
            } => match result {
                Ok(updated) => {
                    if let Some(slot) = self.comments.iter_mut().find(|c| c.id == comment_id) {
                        *slot = updated;
                    }
                    if self.editing_id() == Some(&comment_id) {
                        self.edit = None;
                    }
                    Applied::Applied
                }
                Err(e) => Applied::Failed(failure_notice(Operation::Update, &e)),
            },
            CommentOutcome::Deleted {
                comment_id, result, ..
            } => match result {
                Ok(()) => {
                    self.comments.retain(|c| c.id != comment_id);
                    if self.editing_id() == Some(&comment_id) {
                        self.edit = None;
                    }
                    self.clamp_selection();
                    Applied::Applied
                }
                Err(e) => Applied::Failed(failure_notice(Operation::Delete, &e)),
            },
        }
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.comments.len().saturating_sub(1));
    }

    /// After a reload, follow the server's copy of the comment under edit
    fn resync_edit(&mut self) {
        let Some(edit) = self.edit.as_mut() else {
            return;
        };
        match self.comments.iter().find(|c| c.id == edit.comment_id) {
            Some(comment) => {
                edit.form.sync_seed(&FormSeed::from(comment));
            }
            None => self.edit = None,
        }
    }
}

fn is_mutation_failure(outcome: &CommentOutcome) -> bool {
    match outcome {
        CommentOutcome::Loaded { .. } => false,
        CommentOutcome::Created { result, .. } => result.is_err(),
        CommentOutcome::Updated { result, .. } => result.is_err(),
        CommentOutcome::Deleted { result, .. } => result.is_err(),
    }
}
