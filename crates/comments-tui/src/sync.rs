//! Comment requests and their outcomes.
//!
//! Every outcome carries the context it was issued for (task, comment, load
//! sequence), so the panel can tell whether it still applies when it arrives.

use comments_shared::{api::CommentPayload, Comment, CommentId, TaskId};

use crate::api::{ApiError, CommentsApi};
use crate::interaction::Interaction;

pub const DELETE_PROMPT: &str = "Delete this comment?";

#[derive(Debug, Clone, PartialEq)]
pub enum CommentRequest {
    Load {
        task_id: TaskId,
        seq: u64,
    },
    Create {
        task_id: TaskId,
        payload: CommentPayload,
    },
    Update {
        task_id: TaskId,
        comment_id: CommentId,
        payload: CommentPayload,
    },
    Delete {
        task_id: TaskId,
        comment_id: CommentId,
    },
}

#[derive(Debug)]
pub enum CommentOutcome {
    Loaded {
        task_id: TaskId,
        seq: u64,
        result: Result<Vec<Comment>, ApiError>,
    },
    Created {
        task_id: TaskId,
        result: Result<Comment, ApiError>,
    },
    Updated {
        task_id: TaskId,
        comment_id: CommentId,
        result: Result<Comment, ApiError>,
    },
    Deleted {
        task_id: TaskId,
        comment_id: CommentId,
        result: Result<(), ApiError>,
    },
}

impl CommentOutcome {
    pub fn task_id(&self) -> &TaskId {
        match self {
            CommentOutcome::Loaded { task_id, .. }
            | CommentOutcome::Created { task_id, .. }
            | CommentOutcome::Updated { task_id, .. }
            | CommentOutcome::Deleted { task_id, .. } => task_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Create,
    Update,
    Delete,
}

impl Operation {
    fn action(self) -> &'static str {
        match self {
            Operation::Load => "load comments",
            Operation::Create => "add comment",
            Operation::Update => "edit comment",
            Operation::Delete => "delete comment",
        }
    }

    fn gerund(self) -> &'static str {
        match self {
            Operation::Load => "loading comments",
            Operation::Create => "adding comment",
            Operation::Update => "editing comment",
            Operation::Delete => "deleting comment",
        }
    }

    /// Whether the server's `{ "error": ... }` body is shown to the user
    fn uses_server_message(self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

/// Describe a failed request, e.g. `Failed to add comment (500)`
pub fn failure_message(op: Operation, err: &ApiError) -> String {
    match err {
        ApiError::Status { status, message } => match message {
            Some(message) if op.uses_server_message() => message.clone(),
            _ => format!("Failed to {} ({})", op.action(), status.as_u16()),
        },
        ApiError::Network(e) => e.to_string(),
        ApiError::Decode(_) => err.to_string(),
    }
}

/// Text of the popup shown for a failed mutation
pub fn failure_notice(op: Operation, err: &ApiError) -> String {
    format!("Error {}: {}", op.gerund(), failure_message(op, err))
}

/// Perform a request against the server
pub async fn execute(api: &dyn CommentsApi, request: CommentRequest) -> CommentOutcome {
    match request {
        CommentRequest::Load { task_id, seq } => {
            let result = api.list_comments(&task_id).await;
            CommentOutcome::Loaded { task_id, seq, result }
        }
        CommentRequest::Create { task_id, payload } => {
            let result = api.create_comment(&task_id, &payload).await;
            CommentOutcome::Created { task_id, result }
        }
        CommentRequest::Update {
            task_id,
            comment_id,
            payload,
        } => {
            let result = api.update_comment(&comment_id, &payload).await;
            CommentOutcome::Updated {
                task_id,
                comment_id,
                result,
            }
        }
        CommentRequest::Delete {
            task_id,
            comment_id,
        } => {
            let result = api.delete_comment(&comment_id).await;
            CommentOutcome::Deleted {
                task_id,
                comment_id,
                result,
            }
        }
    }
}

/// Perform a request, asking the user first when it is destructive.
///
/// Returns `None` when the user declined and nothing was sent.
pub async fn dispatch(
    api: &dyn CommentsApi,
    interaction: &dyn Interaction,
    request: CommentRequest,
) -> Option<CommentOutcome> {
    if let CommentRequest::Delete { comment_id, .. } = &request {
        if !interaction.confirm(DELETE_PROMPT).await {
            tracing::debug!(%comment_id, "delete declined");
            return None;
        }
    }
    Some(execute(api, request).await)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::interaction::testing::ScriptedInteraction;
    use pretty_assertions::assert_eq;

    fn delete_request(id: i64) -> CommentRequest {
        CommentRequest::Delete {
            task_id: TaskId::from("1"),
            comment_id: CommentId::Number(id),
        }
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let api = FakeApi::default();
        let interaction = ScriptedInteraction::answering(&[false]);

        let outcome = dispatch(&api, &interaction, delete_request(7)).await;

        assert!(outcome.is_none());
        assert!(api.calls().is_empty());
        assert_eq!(interaction.prompts(), vec![DELETE_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn confirmed_delete_is_sent() {
        let api = FakeApi::default();
        let interaction = ScriptedInteraction::answering(&[true]);

        let outcome = dispatch(&api, &interaction, delete_request(7)).await;

        assert!(matches!(
            outcome,
            Some(CommentOutcome::Deleted { result: Ok(()), .. })
        ));
        assert_eq!(api.calls(), vec!["DELETE /api/comments/7".to_string()]);
    }

    #[tokio::test]
    async fn non_destructive_requests_skip_confirmation() {
        let api = FakeApi::default();
        api.push_comment(Ok(comment(7, "Nice work", None)));
        let interaction = ScriptedInteraction::default();

        let outcome = dispatch(
            &api,
            &interaction,
            CommentRequest::Create {
                task_id: TaskId::from("1"),
                payload: CommentPayload {
                    text: "Nice work".to_string(),
                    author: None,
                },
            },
        )
        .await;

        assert!(matches!(outcome, Some(CommentOutcome::Created { .. })));
        assert!(interaction.prompts().is_empty());
        assert_eq!(
            api.calls(),
            vec![r#"POST /api/tasks/1/comments {"text":"Nice work","author":null}"#.to_string()]
        );
    }

    #[test]
    fn failure_messages_follow_operation() {
        let with_body = status_error(400, Some("Text too long"));
        let bare = status_error(500, None);

        assert_eq!(
            failure_message(Operation::Load, &status_error(404, None)),
            "Failed to load comments (404)"
        );
        assert_eq!(
            failure_message(Operation::Load, &with_body),
            "Failed to load comments (400)"
        );
        assert_eq!(
            failure_notice(Operation::Create, &with_body),
            "Error adding comment: Text too long"
        );
        assert_eq!(
            failure_notice(Operation::Create, &bare),
            "Error adding comment: Failed to add comment (500)"
        );
        assert_eq!(
            failure_notice(Operation::Update, &bare),
            "Error editing comment: Failed to edit comment (500)"
        );
        assert_eq!(
            failure_notice(Operation::Delete, &with_body),
            "Error deleting comment: Failed to delete comment (400)"
        );
    }

    #[test]
    fn decode_failure_is_not_called_a_network_error() {
        let err = ApiError::Decode(serde_json::from_str::<Comment>("[]").unwrap_err());
        let notice = failure_notice(Operation::Create, &err);

        assert!(notice.starts_with("Error adding comment: Invalid response from server"));
    }
}
