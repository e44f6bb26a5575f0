use crate::types::{AgentName, Message};
use serde::Serialize;

/// Append-only, ordered record of one run.
///
/// Only the orchestrator appends; agents receive a shared reference.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript whose first message is the user's task
    pub fn seeded(task: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::text(AgentName::user(), task)],
        }
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The seeded task, if the transcript was started by a user
    pub fn task(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.sender.as_str() == AgentName::USER)
            .map(|m| m.content.as_str())
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
