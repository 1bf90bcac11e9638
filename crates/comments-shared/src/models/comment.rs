use std::fmt;

use serde::{Deserialize, Serialize};

use super::Timestamp;

/// Server-assigned comment identifier.
///
/// The server owns the representation, so both numeric and string ids are
/// accepted and written back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentId {
    Number(i64),
    Text(String),
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentId::Number(n) => write!(f, "{}", n),
            CommentId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CommentId {
    fn from(id: i64) -> Self {
        CommentId::Number(id)
    }
}

impl From<&str> for CommentId {
    fn from(id: &str) -> Self {
        CommentId::Text(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    #[serde(alias = "body")]
    pub text: String,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: Timestamp,
}

impl Comment {
    /// Author name for display, `"Anonymous"` when absent
    pub fn display_author(&self) -> &str {
        self.author.as_deref().unwrap_or("Anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_numeric_id_and_null_author() {
        let comment: Comment = serde_json::from_value(json!({
            "id": 7,
            "text": "Nice work",
            "author": null,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(comment.id, CommentId::Number(7));
        assert_eq!(comment.author, None);
        assert_eq!(comment.display_author(), "Anonymous");
        assert_eq!(comment.created_at.to_string(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn naive_timestamp_does_not_fail_the_record() {
        let comment: Comment = serde_json::from_value(json!({
            "id": 7,
            "text": "Nice work",
            "author": null,
            "created_at": "2024-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(comment.created_at.to_string(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn odd_timestamp_is_kept_as_text() {
        let comment: Comment = serde_json::from_value(json!({
            "id": 7,
            "text": "Nice work",
            "created_at": "01/02/2024 noon"
        }))
        .unwrap();

        assert_eq!(comment.created_at, Timestamp::Raw("01/02/2024 noon".to_string()));
    }

    #[test]
    fn parses_string_id_and_legacy_body_key() {
        let comment: Comment = serde_json::from_value(json!({
            "id": "c-42",
            "body": "line one\nline two",
            "author": "Sam",
            "created_at": "2024-03-05T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(comment.id, CommentId::from("c-42"));
        assert_eq!(comment.text, "line one\nline two");
        assert_eq!(comment.display_author(), "Sam");
    }

    #[test]
    fn missing_author_is_absent() {
        let comment: Comment = serde_json::from_value(json!({
            "id": 1,
            "text": "hi",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(comment.author, None);
    }

    #[test]
    fn id_serializes_in_original_form() {
        assert_eq!(serde_json::to_value(CommentId::Number(7)).unwrap(), json!(7));
        assert_eq!(serde_json::to_value(CommentId::from("abc")).unwrap(), json!("abc"));
        assert_eq!(CommentId::Number(7).to_string(), "7");
        assert_eq!(CommentId::from("abc").to_string(), "abc");
    }
}
