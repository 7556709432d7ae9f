use chrono::Local;
use serde::{ Serialize, Deserialize };

/// Chat titles are cut to this many characters before the ellipsis.
pub const TITLE_MAX_CHARS: usize = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            time: clock_time(),
            route: None,
        }
    }

    pub fn bot(text: impl Into<String>, route: Option<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            time: clock_time(),
            route,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub title: String,
    pub messages: Vec<Message>,
}

impl Chat {
    /// Creates a chat titled after its first user message.
    pub fn new(id: i64, first_message: Message) -> Self {
        Self {
            id,
            title: derive_title(&first_message.text),
            messages: vec![first_message],
        }
    }

    /// Messages are append-only; nothing ever mutates or removes one.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// Wall-clock id for a newly created chat, milliseconds since the epoch.
pub fn next_chat_id() -> i64 {
    Local::now().timestamp_millis()
}

pub fn clock_time() -> String {
    Local::now().format("%H:%M").to_string()
}

pub fn derive_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let cut: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
