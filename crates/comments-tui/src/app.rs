use std::collections::VecDeque;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::{mpsc, oneshot};

use crate::api::CommentsApi;
use crate::editor::launch_external_editor;
use crate::form::FormKey;
use crate::interaction::Interaction;
use crate::panel::Applied;
use crate::sync::{self, CommentOutcome, CommentRequest};
use crate::task_detail::TaskDetailView;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Comments(CommentOutcome),
    Confirm {
        prompt: String,
        reply: oneshot::Sender<bool>,
    },
    Notify(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    CreateForm,
    EditForm,
}

pub struct PendingConfirm {
    pub prompt: String,
    reply: oneshot::Sender<bool>,
}

pub struct App {
    pub view: TaskDetailView,
    pub focus: Focus,

    // Popups, shown one at a time in arrival order
    pub notices: VecDeque<String>,
    pub confirms: VecDeque<PendingConfirm>,
    pub task_prompt: Option<String>,

    pub needs_terminal_clear: bool,

    api: Arc<dyn CommentsApi>,
    interaction: Arc<dyn Interaction>,
    tx: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(
        view: TaskDetailView,
        api: Arc<dyn CommentsApi>,
        interaction: Arc<dyn Interaction>,
        tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            view,
            focus: Focus::List,
            notices: VecDeque::new(),
            confirms: VecDeque::new(),
            task_prompt: None,
            needs_terminal_clear: false,
            api,
            interaction,
            tx,
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.notices.front().map(String::as_str)
    }

    pub fn pending_confirm(&self) -> Option<&PendingConfirm> {
        self.confirms.front()
    }

    /// Issue the initial load for the hosted task
    pub fn start(&mut self) {
        let request = self.view.mount();
        self.dispatch(request);
    }

    /// Run a request in the background; its outcome comes back as an event
    fn dispatch(&self, request: CommentRequest) {
        let api = Arc::clone(&self.api);
        let interaction = Arc::clone(&self.interaction);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = sync::dispatch(api.as_ref(), interaction.as_ref(), request).await;
            if let Some(outcome) = outcome {
                let _ = tx.send(AppEvent::Comments(outcome)).await;
            }
        });
    }

    /// Show a message through the interaction service
    fn report(&self, message: String) {
        let interaction = Arc::clone(&self.interaction);
        tokio::spawn(async move {
            interaction.notify(&message).await;
        });
    }

    /// Handle one event, returns true if app should quit
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Key(key) => return self.handle_key(key),
            AppEvent::Tick => {}
            AppEvent::Comments(outcome) => self.on_outcome(outcome),
            AppEvent::Confirm { prompt, reply } => {
                self.confirms.push_back(PendingConfirm { prompt, reply });
            }
            AppEvent::Notify(message) => self.notices.push_back(message),
        }
        false
    }

    fn on_outcome(&mut self, outcome: CommentOutcome) {
        if let Applied::Failed(message) = self.view.panel.apply(outcome) {
            self.report(message);
        }
        if self.focus == Focus::EditForm && self.view.panel.editing_id().is_none() {
            self.focus = Focus::List;
        }
    }

    /// Handle key events, returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Global quit with Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        // Any key acknowledges the oldest notice
        if self.notices.pop_front().is_some() {
            return false;
        }

        if !self.confirms.is_empty() {
            self.handle_confirm_key(key);
            return false;
        }

        if self.task_prompt.is_some() {
            self.handle_task_prompt_key(key);
            return false;
        }

        match self.focus {
            Focus::List => return self.handle_list_key(key),
            Focus::CreateForm => self.handle_create_form_key(key),
            Focus::EditForm => self.handle_edit_form_key(key),
        }

        false
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let answer = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };
        if let Some(pending) = self.confirms.pop_front() {
            let _ = pending.reply.send(answer);
        }
    }

    fn handle_task_prompt_key(&mut self, key: KeyEvent) {
        let Some(input) = self.task_prompt.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.task_prompt = None,
            KeyCode::Enter => {
                let target = input.clone();
                self.task_prompt = None;
                if let Some(request) = self.view.navigate(&target) {
                    self.focus = Focus::List;
                    self.dispatch(request);
                }
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> bool {
        let panel = &mut self.view.panel;
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => panel.select_next(),
            KeyCode::Char('k') | KeyCode::Up => panel.select_previous(),
            KeyCode::Char('a') | KeyCode::Char('i') => self.focus = Focus::CreateForm,
            KeyCode::Char('e') => {
                let selected = panel.selected_comment().map(|c| c.id.clone());
                if let Some(id) = selected {
                    // Back into an open form keeps its unsaved text
                    if panel.editing_id() == Some(&id) || panel.start_edit(&id) {
                        self.focus = Focus::EditForm;
                    }
                }
            }
            KeyCode::Char('d') => {
                let request = panel
                    .selected_comment()
                    .and_then(|c| panel.request_delete(&c.id));
                if let Some(request) = request {
                    self.dispatch(request);
                }
            }
            KeyCode::Char('r') => {
                let request = panel.begin_load();
                self.dispatch(request);
            }
            KeyCode::Char('g') => self.task_prompt = Some(String::new()),
            _ => {}
        }
        false
    }

    fn handle_create_form_key(&mut self, key: KeyEvent) {
        let panel = &mut self.view.panel;
        match panel.create_form_mut().handle_key(key) {
            FormKey::Handled => {}
            FormKey::Submit => match panel.submit_create() {
                Ok(request) => self.dispatch(request),
                Err(e) => self.report(e.to_string()),
            },
            FormKey::Leave | FormKey::Cancel => self.focus = Focus::List,
            FormKey::ExternalEditor => {
                let current = panel.create_form().text();
                if let Some(edited) = self.run_external_editor(&current) {
                    self.view.panel.create_form_mut().set_text(&edited);
                }
            }
        }
    }

    fn handle_edit_form_key(&mut self, key: KeyEvent) {
        let panel = &mut self.view.panel;
        let Some(form) = panel.edit_form_mut() else {
            self.focus = Focus::List;
            return;
        };
        match form.handle_key(key) {
            FormKey::Handled => {}
            FormKey::Submit => match panel.submit_edit() {
                Ok(Some(request)) => self.dispatch(request),
                Ok(None) => self.focus = Focus::List,
                Err(e) => self.report(e.to_string()),
            },
            FormKey::Cancel => {
                panel.cancel_edit();
                self.focus = Focus::List;
            }
            FormKey::Leave => self.focus = Focus::List,
            FormKey::ExternalEditor => {
                let current = form.text();
                if let Some(edited) = self.run_external_editor(&current) {
                    if let Some(form) = self.view.panel.edit_form_mut() {
                        form.set_text(&edited);
                    }
                }
            }
        }
    }

    fn run_external_editor(&mut self, content: &str) -> Option<String> {
        self.needs_terminal_clear = true;
        match launch_external_editor(content) {
            Ok(edited) => Some(edited),
            Err(e) => {
                tracing::warn!(error = %e, "external editor failed");
                self.notices.push_back(format!("Editor failed: {}", e));
                None
            }
        }
    }
}
