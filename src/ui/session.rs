//! In-memory chat state for one UI session.
//!
//! The session owns the conversation and the input line. A submit moves it
//! from `Idle` to `AwaitingResponse`; the matching completion moves it back.
//! Only one request may be outstanding, and completions are matched by token
//! so a late or foreign reply can never land in the transcript.

use thiserror::Error;

use crate::models::chat::ChatMessage;

pub const WELCOME_MESSAGE: &str =
    "Welcome to Dublin! I'm Connor, your Irish tour guide. Ask me anything about Ireland or Dublin, and I'll make sure your visit is unforgettable!";
pub const THINKING_PLACEHOLDER: &str = "Thinking...";
pub const ERROR_REPLY: &str = "Sorry, something went wrong. Please try again.";

pub const SUGGESTED_PROMPTS: [&str; 3] = [
    "Where's a good place to eat?",
    "What are some nice hidden gems?",
    "Where can I get the best Guinness?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse(RequestToken),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Part of the conversation sent to the proxy.
    Message,
    /// Transient "thinking" bubble while a request is outstanding.
    Placeholder,
    /// Inline failure notice; shown but never sent upstream.
    Notice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub message: ChatMessage,
    pub kind: EntryKind,
}

#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub token: RequestToken,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("nothing to send")]
    EmptyInput,
    #[error("still waiting for the previous reply")]
    RequestInFlight,
}

#[derive(Debug)]
pub struct ChatSession {
    entries: Vec<Entry>,
    input: String,
    state: SessionState,
    next_token: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            entries: vec![Entry {
                message: ChatMessage::assistant(WELCOME_MESSAGE),
                kind: EntryKind::Message,
            }],
            input: String::new(),
            state: SessionState::Idle,
            next_token: 0,
        }
    }

    /// Everything the user sees, oldest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The conversation as the proxy sees it: no placeholder, no notices.
    pub fn conversation(&self) -> Vec<ChatMessage> {
        self.entries
            .iter()
            .filter(|e| e.kind == EntryKind::Message)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Input is disabled while a reply is outstanding.
    pub fn accepts_input(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Fills the input with a suggested prompt without sending it.
    pub fn apply_suggestion(&mut self, index: usize) -> Option<&'static str> {
        let prompt = SUGGESTED_PROMPTS.get(index).copied()?;
        self.input = prompt.to_string();
        Some(prompt)
    }

    pub fn submit(&mut self) -> Result<PendingRequest, SubmitError> {
        if let SessionState::AwaitingResponse(_) = self.state {
            return Err(SubmitError::RequestInFlight);
        }
        if self.input.trim().is_empty() {
            return Err(SubmitError::EmptyInput);
        }

        let content = std::mem::take(&mut self.input);
        self.entries.push(Entry {
            message: ChatMessage::user(content),
            kind: EntryKind::Message,
        });
        let messages = self.conversation();

        self.entries.push(Entry {
            message: ChatMessage::assistant(THINKING_PLACEHOLDER),
            kind: EntryKind::Placeholder,
        });

        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.state = SessionState::AwaitingResponse(token);

        Ok(PendingRequest { token, messages })
    }

    /// Applies the outcome of the request identified by `token`, replacing the
    /// placeholder. Returns the index of the replaced entry, or `None` when the
    /// token is not the one being waited on.
    pub fn complete<E>(&mut self, token: RequestToken, result: Result<String, E>) -> Option<usize> {
        if self.state != SessionState::AwaitingResponse(token) {
            return None;
        }
        self.state = SessionState::Idle;

        let entry = match result {
            Ok(content) => Entry {
                message: ChatMessage::assistant(content),
                kind: EntryKind::Message,
            },
            Err(_) => Entry {
                message: ChatMessage::assistant(ERROR_REPLY),
                kind: EntryKind::Notice,
            },
        };

        match self.entries.iter().rposition(|e| e.kind == EntryKind::Placeholder) {
            Some(index) => {
                self.entries[index] = entry;
                Some(index)
            }
            None => {
                self.entries.push(entry);
                Some(self.entries.len() - 1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    #[test]
    fn starts_with_a_single_welcome() {
        let session = ChatSession::new();
        assert_eq!(session.conversation(), vec![ChatMessage::assistant(WELCOME_MESSAGE)]);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn blank_input_is_ignored() {
        let mut session = ChatSession::new();
        session.set_input("   \t\n");
        assert_eq!(session.submit().unwrap_err(), SubmitError::EmptyInput);
        assert_eq!(session.entries().len(), 1);
        assert!(session.accepts_input());
    }

    #[test]
    fn submit_appends_user_message_and_placeholder() {
        let mut session = ChatSession::new();
        session.set_input("Best Guinness?");
        let pending = session.submit().unwrap();

        assert_eq!(pending.messages.len(), 2);
        assert_eq!(pending.messages[1], ChatMessage::user("Best Guinness?"));
        assert_eq!(session.conversation().len(), 2);
        assert_eq!(session.entries().len(), 3);
        assert_eq!(session.entries()[2].kind, EntryKind::Placeholder);
        assert_eq!(session.input(), "");
        assert!(!session.accepts_input());
    }

    #[test]
    fn user_content_is_kept_verbatim() {
        let mut session = ChatSession::new();
        session.set_input("  **not markdown**  ");
        let pending = session.submit().unwrap();
        assert_eq!(pending.messages[1].content, "  **not markdown**  ");
    }

    #[test]
    fn success_replaces_the_placeholder() {
        let mut session = ChatSession::new();
        session.set_input("Best Guinness?");
        let pending = session.submit().unwrap();

        let index = session.complete::<()>(pending.token, Ok("The Gravity Bar.".into()));
        assert_eq!(index, Some(2));
        assert_eq!(session.conversation().len(), 3);
        assert_eq!(session.conversation()[2], ChatMessage::assistant("The Gravity Bar."));
        assert!(session.entries().iter().all(|e| e.kind != EntryKind::Placeholder));
        assert!(session.accepts_input());
    }

    #[test]
    fn failure_shows_a_notice_that_is_not_sent_upstream() {
        let mut session = ChatSession::new();
        session.set_input("Best Guinness?");
        let pending = session.submit().unwrap();

        session.complete(pending.token, Err("connection refused"));
        let last = session.entries().last().unwrap();
        assert_eq!(last.kind, EntryKind::Notice);
        assert_eq!(last.message.content, ERROR_REPLY);
        assert_eq!(session.conversation().len(), 2);

        session.set_input("Try again");
        let retry = session.submit().unwrap();
        assert_eq!(retry.messages.len(), 3);
        assert!(retry.messages.iter().all(|m| m.content != ERROR_REPLY));
    }

    #[test]
    fn overlapping_submits_are_refused() {
        let mut session = ChatSession::new();
        session.set_input("first");
        let first = session.submit().unwrap();

        session.set_input("second");
        assert_eq!(session.submit().unwrap_err(), SubmitError::RequestInFlight);
        assert_eq!(session.input(), "second");

        session.complete::<()>(first.token, Ok("reply".into()));
        let second = session.submit().unwrap();
        assert_ne!(first.token, second.token);
        assert_eq!(second.messages.last().unwrap().content, "second");
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let mut session = ChatSession::new();
        session.set_input("first");
        let first = session.submit().unwrap();
        session.complete::<()>(first.token, Ok("one".into()));

        session.set_input("second");
        let second = session.submit().unwrap();

        assert_eq!(session.complete::<()>(first.token, Ok("late".into())), None);
        assert_eq!(session.state(), SessionState::AwaitingResponse(second.token));
        assert!(session.conversation().iter().all(|m| m.content != "late"));
    }

    #[test]
    fn suggestions_fill_input_without_sending() {
        let mut session = ChatSession::new();
        assert_eq!(session.apply_suggestion(2), Some("Where can I get the best Guinness?"));
        assert_eq!(session.input(), "Where can I get the best Guinness?");
        assert_eq!(session.entries().len(), 1);
        assert_eq!(session.apply_suggestion(3), None);

        let pending = session.submit().unwrap();
        assert_eq!(pending.messages[1].role, Role::User);
    }
}
