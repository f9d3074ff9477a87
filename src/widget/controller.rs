//! Chat widget controller.

use tracing::{info, warn};

use super::log::{ConversationLog, Role};
use super::render::answer_markup;
use crate::client::ChatTransport;
use crate::config::WidgetConfig;
use crate::error::ChatFailure;
use crate::protocol::{ChatAnswer, ChatRequest};

/// Result of one completed send.
pub type SendOutcome = Result<ChatAnswer, ChatFailure>;

/// The text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatInput {
    value: String,
}

impl ChatInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Take the trimmed query, clearing the field. Blank input is left untouched.
    fn take_query(&mut self) -> Option<String> {
        let query = self.value.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_string();
        self.value.clear();
        Some(query)
    }
}

/// The Bangla-mode checkbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModeToggle {
    checked: bool,
}

impl ModeToggle {
    pub fn new(checked: bool) -> Self {
        Self { checked }
    }

    pub fn is_checked(self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    /// Flip and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.checked = !self.checked;
        self.checked
    }
}

/// Wires the input and send action to a chat transport and renders the
/// exchange into the log.
///
/// # Example
///
/// ```rust,no_run
/// use coursechat_widget::client::HttpChatClient;
/// use coursechat_widget::config::WidgetConfig;
/// use coursechat_widget::widget::{ChatWidget, ConversationLog};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpChatClient::new("http://localhost:8000")?;
/// let mut widget = ChatWidget::new(client, ConversationLog::new(), &WidgetConfig::default());
/// widget.input_mut().set_value("What is a linked list?");
/// widget.on_click().await;
/// println!("{}", widget.log().to_html());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ChatWidget<T> {
    input: ChatInput,
    /// `None` when the deployment has no mode checkbox.
    mode: Option<ModeToggle>,
    log: ConversationLog,
    transport: T,
    detail_path_prefix: String,
}

impl<T: ChatTransport> ChatWidget<T> {
    pub fn new(transport: T, log: ConversationLog, config: &WidgetConfig) -> Self {
        let mode = config
            .mode_flag
            .then(|| ModeToggle::new(config.bangla_mode));
        Self::from_parts(
            ChatInput::new(),
            mode,
            log,
            transport,
            config.detail_path_prefix.clone(),
        )
    }

    pub fn from_parts(
        input: ChatInput,
        mode: Option<ModeToggle>,
        log: ConversationLog,
        transport: T,
        detail_path_prefix: String,
    ) -> Self {
        Self {
            input,
            mode,
            log,
            transport,
            detail_path_prefix,
        }
    }

    pub fn input(&self) -> &ChatInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut ChatInput {
        &mut self.input
    }

    pub fn mode(&self) -> Option<ModeToggle> {
        self.mode
    }

    pub fn mode_mut(&mut self) -> Option<&mut ModeToggle> {
        self.mode.as_mut()
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send button.
    pub async fn on_click(&mut self) -> Option<SendOutcome> {
        self.send().await
    }

    /// Key press in the input field; only `Enter` sends.
    pub async fn on_key(&mut self, key: &str) -> Option<SendOutcome> {
        if key == "Enter" {
            self.send().await
        } else {
            None
        }
    }

    /// Submit the current input and render the exchange.
    ///
    /// Returns `None` for blank input, which changes nothing. Otherwise exactly
    /// one user entry and, after the placeholder is removed, exactly one
    /// assistant entry are appended.
    ///
    /// Dropping the future mid-request (a timeout, a `select!` arm losing)
    /// removes the placeholder and appends nothing further.
    pub async fn send(&mut self) -> Option<SendOutcome> {
        let query = self.input.take_query()?;

        self.log.push_text(Role::User, query.as_str());
        let request = match self.mode {
            Some(toggle) => ChatRequest::with_mode(query, toggle.is_checked()),
            None => ChatRequest::new(query),
        };

        let outcome = {
            let pending = self.log.begin_reply();
            let outcome = exchange(&self.transport, &request).await;
            let removed = pending.settle();
            debug_assert!(removed, "placeholder vanished before its reply");
            outcome
        };

        match &outcome {
            Ok(answer) => {
                info!(
                    name: "chat.reply.rendered",
                    sources = answer.sources.len(),
                    "Answer rendered"
                );
                self.log
                    .push_markup(Role::Assistant, answer_markup(answer, &self.detail_path_prefix));
            }
            Err(failure) => {
                warn!(name: "chat.reply.failed", error = %failure, "Chat request failed");
                self.log.push_text(Role::Assistant, failure.user_message());
            }
        }

        Some(outcome)
    }
}

async fn exchange<T: ChatTransport>(transport: &T, request: &ChatRequest) -> SendOutcome {
    let reply = transport.send(request).await?;
    reply.into_answer().ok_or(ChatFailure::Application)
}
