//! Conversation log: the scrolling list of rendered messages.

use std::fmt;

use super::LOADING_TEXT;
use super::render::escape_text;

/// Who an entry speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// CSS class used in the HTML snapshot.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "ai",
        }
    }
}

/// Entry content. `Text` is inserted literally, `Markup` as HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Markup(String),
}

impl Body {
    /// HTML for this body.
    pub fn to_html(&self) -> String {
        match self {
            Self::Text(text) => escape_text(text),
            Self::Markup(html) => html.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: EntryId,
    pub role: Role,
    pub body: Body,
    /// The loading placeholder of an in-flight request.
    pub pending: bool,
}

/// Observer for log mutations, the terminal equivalent of a repaint.
pub trait LogView: Send {
    fn appended(&mut self, _entry: &LogEntry) {}
    fn removed(&mut self, _entry: &LogEntry) {}
}

/// Placeholder guard for one in-flight request.
///
/// Holds the log for as long as the request is outstanding. [`settle`]
/// removes the placeholder; dropping an unsettled guard (a cancelled send)
/// removes it too, so each placeholder leaves the log exactly once.
///
/// [`settle`]: PendingReply::settle
#[must_use = "dropping a pending reply removes its placeholder immediately"]
#[derive(Debug)]
pub struct PendingReply<'a> {
    log: &'a mut ConversationLog,
    id: EntryId,
    settled: bool,
}

impl PendingReply<'_> {
    /// The log, placeholder included.
    pub fn log(&self) -> &ConversationLog {
        self.log
    }

    /// Remove the placeholder. Returns `false` if it was already gone.
    pub fn settle(mut self) -> bool {
        self.settled = true;
        self.log.remove(self.id)
    }
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.log.remove(self.id);
        }
    }
}

/// Append-only, chronologically ordered list of entries.
///
/// Every append scrolls to the bottom. Only [`PendingReply`] placeholders are
/// ever removed.
#[derive(Default)]
pub struct ConversationLog {
    entries: Vec<LogEntry>,
    next_id: u64,
    scroll_top: usize,
    view: Option<Box<dyn LogView>>,
}

impl fmt::Debug for ConversationLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationLog")
            .field("entries", &self.entries)
            .field("scroll_top", &self.scroll_top)
            .field("has_view", &self.view.is_some())
            .finish()
    }
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(view: Box<dyn LogView>) -> Self {
        Self {
            view: Some(view),
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Number of placeholders currently shown.
    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|e| e.pending).count()
    }

    /// Append literal text.
    pub fn push_text(&mut self, role: Role, text: impl Into<String>) -> EntryId {
        self.push(role, Body::Text(text.into()), false)
    }

    /// Append markup.
    pub fn push_markup(&mut self, role: Role, html: impl Into<String>) -> EntryId {
        self.push(role, Body::Markup(html.into()), false)
    }

    /// Show the loading placeholder until the returned guard is settled or dropped.
    pub fn begin_reply(&mut self) -> PendingReply<'_> {
        let id = self.push(Role::Assistant, Body::Text(LOADING_TEXT.to_string()), true);
        PendingReply {
            log: self,
            id,
            settled: false,
        }
    }

    fn remove(&mut self, id: EntryId) -> bool {
        let Some(pos) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = self.entries.remove(pos);
        if let Some(view) = self.view.as_mut() {
            view.removed(&entry);
        }
        true
    }

    /// Scroll offset, clamped to the content height like a DOM container.
    pub fn scroll_top(&self) -> usize {
        self.scroll_top.min(self.scroll_height())
    }

    pub fn scroll_height(&self) -> usize {
        self.entries.len()
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.scroll_top() == self.scroll_height()
    }

    /// Render the log as the `#chat-messages` container.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<div id=\"chat-messages\">\n");
        for entry in &self.entries {
            html.push_str(&format!(
                "  <div class=\"message {}\">{}</div>\n",
                entry.role.css_class(),
                entry.body.to_html()
            ));
        }
        html.push_str("</div>\n");
        html
    }

    fn push(&mut self, role: Role, body: Body, pending: bool) -> EntryId {
        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.entries.push(LogEntry {
            id,
            role,
            body,
            pending,
        });
        self.scroll_top = self.scroll_height();
        if let (Some(view), Some(entry)) = (self.view.as_mut(), self.entries.last()) {
            view.appended(entry);
        }
        id
    }
}
