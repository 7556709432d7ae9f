use std::sync::Arc;

use log::{ info, warn };
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::backend::BackendClient;
use crate::models::chat::{ next_chat_id, Chat, Message };

/// Substitute bot reply when the backend call fails for any reason.
pub const FALLBACK_REPLY: &str = "Sorry, something went wrong.";

/// Everything the chat screen shows: the chat list (newest first), which
/// chat is open, and whether a reply is still in flight.
#[derive(Default)]
pub struct ChatState {
    chats: Vec<Chat>,
    active: Option<i64>,
    bot_processing: bool,
    last_id: i64,
}

impl ChatState {
    fn chat_mut(&mut self, id: i64) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|chat| chat.id == id)
    }

    /// Issues a fresh chat id: wall-clock millis, bumped past the last
    /// issued id when two allocations land in the same millisecond. Ids
    /// are never re-issued, so a reserved id cannot alias an existing
    /// chat.
    fn allocate_id(&mut self) -> i64 {
        let mut id = next_chat_id();
        if id <= self.last_id {
            id = self.last_id + 1;
        }
        self.last_id = id;
        id
    }

    fn active_chat(&self) -> Option<&Chat> {
        let id = self.active?;
        self.chats.iter().find(|chat| chat.id == id)
    }
}

/// Conversation state plus the reply pipeline.
///
/// `send_message` mutates the state synchronously and then issues the
/// backend request as an independent fire-and-forget task. Overlapping
/// requests race without ordering guarantees; each delivers to whatever
/// chat currently carries its originating id (last write wins) and there
/// is no cancellation.
pub struct ChatSession {
    state: Arc<Mutex<ChatState>>,
    backend: Arc<dyn BackendClient>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn BackendClient>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChatState::default())),
            backend,
        }
    }

    /// Reserves a fresh chat id and makes it active. The chat object
    /// itself is only created once the first message is sent to it.
    pub async fn start_new_chat(&self) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.allocate_id();
        state.active = Some(id);
        id
    }

    /// Appends a user message and kicks off the bot reply.
    ///
    /// Blank input is ignored. When the active id has no chat object yet
    /// (fresh session or just after [`Self::start_new_chat`]) a chat is
    /// created with that id, titled from this first message, and prepended
    /// to the list. Returns the reply task's handle so callers can await
    /// settlement; the task completes on its own either way.
    pub async fn send_message(&self, text: &str) -> Option<JoinHandle<()>> {
        if text.trim().is_empty() {
            return None;
        }

        let chat_id;
        {
            let mut state = self.state.lock().await;
            let active = state.active;
            let existing = active.filter(|id| state.chats.iter().any(|chat| chat.id == *id));
            match existing {
                Some(id) => {
                    chat_id = id;
                    if let Some(chat) = state.chat_mut(id) {
                        chat.push(Message::user(text));
                    }
                }
                None => {
                    chat_id = match active {
                        Some(id) => id,
                        None => state.allocate_id(),
                    };
                    let chat = Chat::new(chat_id, Message::user(text));
                    info!("created chat {} titled {:?}", chat_id, chat.title);
                    state.chats.insert(0, chat);
                    state.active = Some(chat_id);
                }
            }
            state.bot_processing = true;
        }

        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);
        let text = text.to_string();
        Some(tokio::spawn(async move {
            let message = match backend.chat(&text).await {
                Ok(reply) => Message::bot(reply.reply, reply.route),
                Err(err) => {
                    warn!("chat request failed: {}", err);
                    Message::bot(FALLBACK_REPLY, None)
                }
            };

            let mut state = state.lock().await;
            match state.chat_mut(chat_id) {
                Some(chat) => chat.push(message),
                // History was cleared while the request was in flight;
                // the reply has nowhere to go.
                None => warn!("dropping reply for deleted chat {}", chat_id),
            }
            state.bot_processing = false;
        }))
    }

    pub async fn is_bot_processing(&self) -> bool {
        self.state.lock().await.bot_processing
    }

    /// Opens an existing chat; false when the id is unknown.
    pub async fn open_chat(&self, id: i64) -> bool {
        let mut state = self.state.lock().await;
        if state.chats.iter().any(|chat| chat.id == id) {
            state.active = Some(id);
            true
        } else {
            false
        }
    }

    /// (id, title) pairs in display order, newest chat first.
    pub async fn chat_list(&self) -> Vec<(i64, String)> {
        self.state
            .lock()
            .await
            .chats
            .iter()
            .map(|chat| (chat.id, chat.title.clone()))
            .collect()
    }

    /// Sidebar search: case-insensitive substring match over titles.
    pub async fn search_chats(&self, query: &str) -> Vec<(i64, String)> {
        let query = query.to_lowercase();
        self.state
            .lock()
            .await
            .chats
            .iter()
            .filter(|chat| chat.title.to_lowercase().contains(&query))
            .map(|chat| (chat.id, chat.title.clone()))
            .collect()
    }

    pub async fn active_chat(&self) -> Option<Chat> {
        self.state.lock().await.active_chat().cloned()
    }

    /// Messages of the active chat that match the in-chat search query;
    /// an empty query matches everything.
    pub async fn visible_messages(&self, filter: &str) -> Vec<Message> {
        let filter = filter.to_lowercase();
        let state = self.state.lock().await;
        let Some(chat) = state.active_chat() else {
            return Vec::new();
        };
        chat.messages
            .iter()
            .filter(|message| {
                filter.is_empty() || message.text.to_lowercase().contains(&filter)
            })
            .cloned()
            .collect()
    }

    /// The bulk "delete all history" action; there is no per-chat delete.
    pub async fn delete_history(&self) {
        let mut state = self.state.lock().await;
        state.chats.clear();
        state.active = None;
        info!("chat history deleted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ BackendError, ChatReply, LoginSuccess };
    use crate::models::chat::Sender;
    use async_trait::async_trait;

    /// Echoes a fixed reply; `fail` makes every chat call a transport-free
    /// rejection instead.
    struct ScriptedBackend {
        reply: String,
        fail: bool,
    }

    impl ScriptedBackend {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self { reply: reply.to_string(), fail: false })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: String::new(), fail: true })
        }
    }

    #[async_trait]
    impl crate::backend::BackendClient for ScriptedBackend {
        async fn chat(&self, _message: &str) -> Result<ChatReply, BackendError> {
            if self.fail {
                return Err(BackendError::Rejected { status: 500, detail: None });
            }
            Ok(ChatReply { reply: self.reply.clone(), route: Some("faq".to_string()) })
        }

        async fn login(&self, _u: &str, _p: &str) -> Result<LoginSuccess, BackendError> {
            Ok(LoginSuccess { email: None })
        }
    }

    async fn settled(handle: Option<JoinHandle<()>>) {
        handle.expect("message should spawn a reply task").await.unwrap();
    }

    #[tokio::test]
    async fn first_send_creates_a_titled_chat() {
        let session = ChatSession::new(ScriptedBackend::replying("hello"));
        settled(session.send_message("do I need a flu shot every year?").await).await;

        let chats = session.chat_list().await;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].1, "do I need a flu shot ever...");

        let chat = session.active_chat().await.unwrap();
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].sender, Sender::User);
        assert_eq!(chat.messages[1].sender, Sender::Bot);
        assert_eq!(chat.messages[1].text, "hello");
        assert_eq!(chat.messages[1].route.as_deref(), Some("faq"));
    }

    #[tokio::test]
    async fn blank_input_is_ignored() {
        let session = ChatSession::new(ScriptedBackend::replying("hello"));
        assert!(session.send_message("   ").await.is_none());
        assert!(session.chat_list().await.is_empty());
    }

    #[tokio::test]
    async fn new_chats_are_prepended() {
        let session = ChatSession::new(ScriptedBackend::replying("ok"));
        settled(session.send_message("first topic").await).await;
        session.start_new_chat().await;
        settled(session.send_message("second topic").await).await;

        let chats = session.chat_list().await;
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].1, "second topic");
        assert_eq!(chats[1].1, "first topic");
    }

    #[tokio::test]
    async fn back_to_back_chats_get_distinct_ids() {
        // Fast enough that the wall clock cannot have moved between
        // allocations; the ids must still differ.
        let session = ChatSession::new(ScriptedBackend::replying("ok"));
        settled(session.send_message("first question").await).await;
        let first_id = session.active_chat().await.unwrap().id;

        let reserved_id = session.start_new_chat().await;
        assert_ne!(first_id, reserved_id);

        settled(session.send_message("second question").await).await;
        let chats = session.chat_list().await;
        assert_eq!(chats.len(), 2, "second send merged into the first chat");
        assert_eq!(chats[0].1, "second question");
        assert_eq!(session.active_chat().await.unwrap().id, reserved_id);

        let first = session.open_chat(first_id).await;
        assert!(first);
        assert_eq!(session.active_chat().await.unwrap().messages.len(), 2);
    }

    #[tokio::test]
    async fn reply_lands_on_the_originating_chat() {
        let session = ChatSession::new(ScriptedBackend::replying("late reply"));
        let handle = session.send_message("original question").await;
        let first_id = session.active_chat().await.unwrap().id;

        // The user moves on before the reply arrives.
        session.start_new_chat().await;
        settled(handle).await;

        assert!(session.open_chat(first_id).await);
        let chat = session.active_chat().await.unwrap();
        assert_eq!(chat.messages.last().unwrap().text, "late reply");
    }

    #[tokio::test]
    async fn backend_failure_becomes_the_fallback_bubble() {
        let session = ChatSession::new(ScriptedBackend::failing());
        settled(session.send_message("anything").await).await;

        let chat = session.active_chat().await.unwrap();
        assert_eq!(chat.messages[1].text, FALLBACK_REPLY);
        assert_eq!(chat.messages[1].sender, Sender::Bot);
        assert!(!session.is_bot_processing().await);
    }

    #[tokio::test]
    async fn reply_for_a_deleted_chat_is_dropped() {
        let session = ChatSession::new(ScriptedBackend::replying("too late"));
        let handle = session.send_message("question").await;
        session.delete_history().await;
        settled(handle).await;

        assert!(session.chat_list().await.is_empty());
        assert!(session.active_chat().await.is_none());
    }

    #[tokio::test]
    async fn search_filters_titles_case_insensitively() {
        let session = ChatSession::new(ScriptedBackend::replying("ok"));
        settled(session.send_message("Flu symptoms").await).await;
        session.start_new_chat().await;
        settled(session.send_message("booking an appointment").await).await;

        let hits = session.search_chats("FLU").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, "Flu symptoms");
        assert!(session.search_chats("dentist").await.is_empty());
    }

    #[tokio::test]
    async fn message_filter_hides_non_matching_messages() {
        let session = ChatSession::new(ScriptedBackend::replying("drink water"));
        settled(session.send_message("what helps a headache").await).await;

        let visible = session.visible_messages("water").await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].text, "drink water");
        assert_eq!(session.visible_messages("").await.len(), 2);
    }

    #[tokio::test]
    async fn opening_an_unknown_chat_fails() {
        let session = ChatSession::new(ScriptedBackend::replying("ok"));
        assert!(!session.open_chat(42).await);
    }
}
