use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::app::AppEvent;

/// User-facing confirmation and notification capability.
///
/// Comment operations never talk to the terminal directly; they go through
/// this trait so the popups can be replaced by a headless double.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Ask a yes/no question and wait for the answer
    async fn confirm(&self, prompt: &str) -> bool;

    /// Show a message the user has to acknowledge
    async fn notify(&self, message: &str);
}

/// Routes prompts through the event loop, which renders them as popups
pub struct ChannelInteraction {
    tx: mpsc::Sender<AppEvent>,
}

impl ChannelInteraction {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Interaction for ChannelInteraction {
    async fn confirm(&self, prompt: &str) -> bool {
        let (reply, answer) = oneshot::channel();
        let event = AppEvent::Confirm {
            prompt: prompt.to_string(),
            reply,
        };
        if self.tx.send(event).await.is_err() {
            return false;
        }
        // A dropped reply (app shutting down) counts as "no".
        answer.await.unwrap_or(false)
    }

    async fn notify(&self, message: &str) {
        let _ = self.tx.send(AppEvent::Notify(message.to_string())).await;
    }
}

#[cfg(test)]
pub mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Answers confirmations from a script and records everything it was shown
    #[derive(Default)]
    pub struct ScriptedInteraction {
        answers: Mutex<VecDeque<bool>>,
        prompts: Mutex<Vec<String>>,
        notices: Mutex<Vec<String>>,
    }

    impl ScriptedInteraction {
        pub fn answering(answers: &[bool]) -> Self {
            Self {
                answers: Mutex::new(answers.iter().copied().collect()),
                ..Self::default()
            }
        }

        pub fn notices(&self) -> Vec<String> {
            self.notices.lock().unwrap().clone()
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Interaction for ScriptedInteraction {
        async fn confirm(&self, prompt: &str) -> bool {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.answers.lock().unwrap().pop_front().unwrap_or(false)
        }

        async fn notify(&self, message: &str) {
            self.notices.lock().unwrap().push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn confirm_waits_for_reply_from_event_loop() {
        let (tx, mut rx) = mpsc::channel(4);
        let interaction = ChannelInteraction::new(tx);

        let responder = tokio::spawn(async move {
            match rx.recv().await {
                Some(AppEvent::Confirm { prompt, reply }) => {
                    assert_eq!(prompt, "Delete this comment?");
                    reply.send(true).unwrap();
                }
                other => panic!("unexpected event: {:?}", other),
            }
        });

        assert!(interaction.confirm("Delete this comment?").await);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn confirm_is_false_when_loop_is_gone() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let interaction = ChannelInteraction::new(tx);

        assert!(!interaction.confirm("Delete this comment?").await);
    }

    #[tokio::test]
    async fn notify_posts_event() {
        let (tx, mut rx) = mpsc::channel(4);
        let interaction = ChannelInteraction::new(tx);

        interaction.notify("Error adding comment: boom").await;

        match rx.recv().await {
            Some(AppEvent::Notify(msg)) => assert_eq!(msg, "Error adding comment: boom"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
