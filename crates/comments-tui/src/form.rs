use comments_shared::{api::CommentPayload, Comment, CommentId};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::TextArea;

use crate::editor::{create_textarea, textarea_content, to_input};

/// Initial values a form is seeded from.
///
/// `origin` ties an edit seed to the comment it came from, so two comments
/// with identical text still count as different seeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSeed {
    pub origin: Option<CommentId>,
    pub text: String,
    pub author: Option<String>,
}

impl From<&Comment> for FormSeed {
    fn from(comment: &Comment) -> Self {
        Self {
            origin: Some(comment.id.clone()),
            text: comment.text.clone(),
            author: comment.author.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Comment text is required")]
    EmptyText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Text,
    Author,
}

/// What a key press asks the owner of the form to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    Handled,
    Submit,
    Cancel,
    /// Go back to the list; the form and its text stay as they are
    Leave,
    ExternalEditor,
}

pub struct CommentForm {
    seed: FormSeed,
    text: TextArea<'static>,
    author: String,
    focus: FormField,
    submit_label: String,
    cancellable: bool,
}

impl CommentForm {
    /// Form used to add a comment: no cancel button, cleared after submit
    pub fn create() -> Self {
        Self::new(FormSeed::default())
    }

    /// Inline form used to edit an existing comment
    pub fn edit(seed: FormSeed) -> Self {
        Self::new(seed).with_submit_label("Update").cancellable()
    }

    /// Form with a `"Submit"` button and no cancel action
    pub fn new(seed: FormSeed) -> Self {
        let text = create_textarea(&seed.text);
        let author = seed.author.clone().unwrap_or_default();
        Self {
            seed,
            text,
            author,
            focus: FormField::Text,
            submit_label: "Submit".to_string(),
            cancellable: false,
        }
    }

    pub fn with_submit_label(mut self, label: &str) -> Self {
        self.submit_label = label.to_string();
        self
    }

    /// Offer a cancel action; the fields are kept after submit
    pub fn cancellable(mut self) -> Self {
        self.cancellable = true;
        self
    }

    pub fn submit_label(&self) -> &str {
        &self.submit_label
    }

    pub fn is_cancellable(&self) -> bool {
        self.cancellable
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn text(&self) -> String {
        textarea_content(&self.text)
    }

    pub fn text_lines(&self) -> &[String] {
        self.text.lines()
    }

    /// (row, column) of the cursor in the text field
    pub fn text_cursor(&self) -> (usize, usize) {
        self.text.cursor()
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn set_text(&mut self, content: &str) {
        self.text = create_textarea(content);
    }

    pub fn set_author(&mut self, author: &str) {
        self.author = author.to_string();
    }

    /// Re-seed the fields when the seed changed since the last call.
    ///
    /// Unsaved keystrokes are discarded in that case. Returns whether a reset
    /// happened.
    pub fn sync_seed(&mut self, seed: &FormSeed) -> bool {
        if self.seed == *seed {
            return false;
        }
        self.seed = seed.clone();
        self.reset_fields();
        true
    }

    fn reset_fields(&mut self) {
        self.text = create_textarea(&self.seed.text);
        self.author = self.seed.author.clone().unwrap_or_default();
    }

    /// Validate and produce the payload to send.
    ///
    /// A creation form clears itself as soon as it hands out a payload; the
    /// caller's request may still fail.
    pub fn submit(&mut self) -> Result<CommentPayload, ValidationError> {
        let text = self.text().trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let author = self.author.trim();
        let payload = CommentPayload {
            text,
            author: (!author.is_empty()).then(|| author.to_string()),
        };

        if !self.cancellable {
            self.text = create_textarea("");
            self.author.clear();
            self.focus = FormField::Text;
        }

        Ok(payload)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormKey {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('s') if ctrl => FormKey::Submit,
            KeyCode::Char('e') if ctrl && self.focus == FormField::Text => FormKey::ExternalEditor,
            KeyCode::Char('l') if ctrl => FormKey::Leave,
            KeyCode::Esc if self.cancellable => FormKey::Cancel,
            KeyCode::Esc => FormKey::Leave,
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = match self.focus {
                    FormField::Text => FormField::Author,
                    FormField::Author => FormField::Text,
                };
                FormKey::Handled
            }
            KeyCode::Enter if self.focus == FormField::Author => FormKey::Submit,
            _ => {
                match self.focus {
                    FormField::Text => {
                        self.text.input(to_input(key));
                    }
                    FormField::Author => match key.code {
                        KeyCode::Char(c) if !ctrl => self.author.push(c),
                        KeyCode::Backspace => {
                            self.author.pop();
                        }
                        _ => {}
                    },
                }
                FormKey::Handled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(form: &mut CommentForm, s: &str) {
        for c in s.chars() {
            form.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn comment(id: i64, text: &str, author: Option<&str>) -> Comment {
        Comment {
            id: CommentId::Number(id),
            text: text.to_string(),
            author: author.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into(),
        }
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let mut form = CommentForm::create();
        form.set_text("   \n\t ");
        form.set_author("Sam");

        assert_eq!(form.submit(), Err(ValidationError::EmptyText));
        // Nothing was submitted, so nothing is cleared either
        assert_eq!(form.author(), "Sam");
    }

    #[test]
    fn submit_trims_text_and_author() {
        let mut form = CommentForm::create();
        form.set_text("  Nice work \n");
        form.set_author("  Sam ");

        let payload = form.submit().unwrap();
        assert_eq!(payload.text, "Nice work");
        assert_eq!(payload.author.as_deref(), Some("Sam"));
    }

    #[test]
    fn blank_author_becomes_absent() {
        let mut form = CommentForm::create();
        form.set_text("Nice work");
        form.set_author("   ");

        assert_eq!(form.submit().unwrap().author, None);
    }

    #[test]
    fn creation_form_clears_after_submit() {
        let mut form = CommentForm::create();
        type_str(&mut form, "hello");
        form.handle_key(key(KeyCode::Tab));
        type_str(&mut form, "Ann");

        form.submit().unwrap();

        assert_eq!(form.text(), "");
        assert_eq!(form.author(), "");
        assert_eq!(form.focus(), FormField::Text);
    }

    #[test]
    fn edit_form_keeps_fields_after_submit() {
        let mut form = CommentForm::edit(FormSeed::from(&comment(7, "Nice work", None)));
        form.set_text("Updated");
        form.set_author("Sam");

        let payload = form.submit().unwrap();

        assert_eq!(payload.text, "Updated");
        assert_eq!(form.text(), "Updated");
        assert_eq!(form.author(), "Sam");
    }

    #[test]
    fn labels_and_cancel_affordance() {
        let create = CommentForm::create();
        assert_eq!(create.submit_label(), "Submit");
        assert!(!create.is_cancellable());

        let edit = CommentForm::edit(FormSeed::default());
        assert_eq!(edit.submit_label(), "Update");
        assert!(edit.is_cancellable());

        let custom = CommentForm::new(FormSeed::default()).with_submit_label("Post");
        assert_eq!(custom.submit_label(), "Post");
        assert!(!custom.is_cancellable());
    }

    #[test]
    fn seed_change_overrides_local_edits() {
        let mut form = CommentForm::edit(FormSeed::from(&comment(1, "one", Some("Ann"))));
        form.set_text("half-typed");

        // Same seed: keystrokes survive
        assert!(!form.sync_seed(&FormSeed::from(&comment(1, "one", Some("Ann")))));
        assert_eq!(form.text(), "half-typed");

        // New seed: fields follow it
        assert!(form.sync_seed(&FormSeed::from(&comment(2, "two", None))));
        assert_eq!(form.text(), "two");
        assert_eq!(form.author(), "");
    }

    #[test]
    fn escape_cancels_only_when_cancellable() {
        let mut create = CommentForm::create();
        assert_eq!(create.handle_key(key(KeyCode::Esc)), FormKey::Leave);

        let mut edit = CommentForm::edit(FormSeed::from(&comment(1, "one", None)));
        edit.set_text("changed");
        assert_eq!(edit.handle_key(key(KeyCode::Esc)), FormKey::Cancel);
        assert_eq!(edit.text(), "changed");
    }

    #[test]
    fn ctrl_l_leaves_either_form_untouched() {
        let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);

        let mut edit = CommentForm::edit(FormSeed::from(&comment(1, "one", None)));
        edit.set_text("changed");
        assert_eq!(edit.handle_key(ctrl_l), FormKey::Leave);
        assert_eq!(edit.text(), "changed");

        let mut create = CommentForm::create();
        assert_eq!(create.handle_key(ctrl_l), FormKey::Leave);
    }

    #[test]
    fn enter_adds_line_in_text_and_submits_from_author() {
        let mut form = CommentForm::create();
        type_str(&mut form, "a");
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormKey::Handled);
        type_str(&mut form, "b");
        assert_eq!(form.text(), "a\nb");

        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.handle_key(key(KeyCode::Enter)), FormKey::Submit);
        assert_eq!(
            form.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            FormKey::Submit
        );
    }

    #[test]
    fn author_field_supports_backspace() {
        let mut form = CommentForm::create();
        form.handle_key(key(KeyCode::Tab));
        type_str(&mut form, "Samx");
        form.handle_key(key(KeyCode::Backspace));

        assert_eq!(form.author(), "Sam");
    }
}
