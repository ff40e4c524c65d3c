//! Chat transport capability and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use thiserror::Error;

/// Opaque reference to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChatRef(pub i64);

/// Opaque reference to a delivered message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat: ChatRef,
    pub message_id: i64,
}

/// What a button press sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Press {
    /// An action payload delivered back to the dispatcher.
    Callback(String),
    /// An external link the client opens.
    Url(String),
}

/// One inline button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub press: Press,
}

impl Button {
    pub fn callback(label: impl Into<String>, payload: impl ToString) -> Self {
        Self {
            label: label.into(),
            press: Press::Callback(payload.to_string()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            press: Press::Url(url.into()),
        }
    }
}

/// A rendered screen: message text plus an inline keyboard (rows of
/// buttons).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    pub keyboard: Vec<Vec<Button>>,
}

/// Errors reported by the chat transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The edit would not change the message. Treated as success by every
    /// caller.
    #[error("content unchanged")]
    ContentUnchanged,

    /// Delivery failed.
    #[error("transport failure: {0}")]
    Failed(String),
}

/// Trait for outbound chat operations.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a new message and returns a reference to it.
    async fn send(&self, chat: ChatRef, screen: &Screen) -> Result<MessageRef, TransportError>;

    /// Replaces a message's text and keyboard.
    async fn edit_text(&self, message: MessageRef, screen: &Screen) -> Result<(), TransportError>;

    /// Replaces a media message's caption and keyboard.
    async fn edit_caption(
        &self,
        message: MessageRef,
        screen: &Screen,
    ) -> Result<(), TransportError>;

    /// Deletes a message.
    async fn delete(&self, message: MessageRef) -> Result<(), TransportError>;

    /// Shows a short transient alert to the user.
    async fn alert(&self, chat: ChatRef, text: &str) -> Result<(), TransportError>;
}

#[derive(Debug, Default)]
struct InMemoryMessengerState {
    sent: Vec<(ChatRef, Screen)>,
    edits: Vec<(MessageRef, Screen)>,
    /// Every screen that reached the user, sends and edits interleaved.
    delivered: Vec<Screen>,
    deleted: Vec<MessageRef>,
    alerts: Vec<(ChatRef, String)>,
    next_message_id: i64,
    fail_on_edit: bool,
    unchanged_on_edit: bool,
}

/// In-memory messenger for testing; records everything it is asked to
/// deliver.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessenger {
    state: Arc<RwLock<InMemoryMessengerState>>,
}

impl InMemoryMessenger {
    /// Creates a new in-memory messenger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures edits to fail, forcing the delete-and-resend fallback.
    pub fn set_fail_on_edit(&self, fail: bool) {
        self.state.write().unwrap().fail_on_edit = fail;
    }

    /// Configures edits to report the content-unchanged outcome.
    pub fn set_unchanged_on_edit(&self, unchanged: bool) {
        self.state.write().unwrap().unchanged_on_edit = unchanged;
    }

    /// Returns every screen sent as a new message, in order.
    pub fn sent(&self) -> Vec<(ChatRef, Screen)> {
        self.state.read().unwrap().sent.clone()
    }

    /// Returns every successful edit, in order.
    pub fn edits(&self) -> Vec<(MessageRef, Screen)> {
        self.state.read().unwrap().edits.clone()
    }

    /// Returns every deleted message, in order.
    pub fn deleted(&self) -> Vec<MessageRef> {
        self.state.read().unwrap().deleted.clone()
    }

    /// Returns every alert shown, in order.
    pub fn alerts(&self) -> Vec<(ChatRef, String)> {
        self.state.read().unwrap().alerts.clone()
    }

    /// Returns the most recently delivered screen, whether sent or edited.
    pub fn last_screen(&self) -> Option<Screen> {
        self.state.read().unwrap().delivered.last().cloned()
    }
}

#[async_trait]
impl Messenger for InMemoryMessenger {
    async fn send(&self, chat: ChatRef, screen: &Screen) -> Result<MessageRef, TransportError> {
        let mut state = self.state.write().unwrap();
        state.next_message_id += 1;
        let message_id = state.next_message_id;
        state.sent.push((chat, screen.clone()));
        state.delivered.push(screen.clone());
        Ok(MessageRef { chat, message_id })
    }

    async fn edit_text(&self, message: MessageRef, screen: &Screen) -> Result<(), TransportError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_edit {
            return Err(TransportError::Failed("edit rejected".to_string()));
        }
        if state.unchanged_on_edit {
            return Err(TransportError::ContentUnchanged);
        }
        state.edits.push((message, screen.clone()));
        state.delivered.push(screen.clone());
        Ok(())
    }

    async fn edit_caption(
        &self,
        message: MessageRef,
        screen: &Screen,
    ) -> Result<(), TransportError> {
        self.edit_text(message, screen).await
    }

    async fn delete(&self, message: MessageRef) -> Result<(), TransportError> {
        self.state.write().unwrap().deleted.push(message);
        Ok(())
    }

    async fn alert(&self, chat: ChatRef, text: &str) -> Result<(), TransportError> {
        self.state
            .write()
            .unwrap()
            .alerts
            .push((chat, text.to_string()));
        Ok(())
    }
}
