use serde::{Deserialize, Serialize};

/// Body of both the create and the update request.
///
/// `author` is always sent; an absent name goes over the wire as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentPayload {
    pub text: String,
    pub author: Option<String>,
}

/// Structured failure body returned by the server on some non-2xx responses
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn absent_author_is_sent_as_null() {
        let payload = CommentPayload {
            text: "Nice work".to_string(),
            author: None,
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "text": "Nice work", "author": null })
        );
    }

    #[test]
    fn error_response_tolerates_missing_field() {
        let body: ErrorResponse = serde_json::from_str(r#"{"detail":"nope"}"#).unwrap();
        assert_eq!(body.error, None);

        let body: ErrorResponse = serde_json::from_str(r#"{"error":"Text too long"}"#).unwrap();
        assert_eq!(body.error.as_deref(), Some("Text too long"));
    }
}
