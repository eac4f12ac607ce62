//! Single-writer session store: conversations, their histories, the active
//! selection and the search filter, plus a timeline of pending status
//! transitions for locally sent messages.
//!
//! The store never fails. Unknown ids degrade to empty views and drafts that
//! cannot be sent are ignored.

use crate::config::ChatConfig;
use crate::seed::Seed;
use crate::state::{
    Conversation, ConversationId, Message, MessageDraft, MessageId, MessageStatus, Payload,
    User, UserId,
};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
struct Transition {
    conversation: ConversationId,
    message: MessageId,
    status: MessageStatus,
}

/// Pending transitions ordered by deadline, ties broken by scheduling order.
#[derive(Debug, Clone, Default)]
struct Timeline {
    queue: BTreeMap<(DateTime<Utc>, u64), Transition>,
    seq: u64,
}

impl Timeline {
    fn schedule(&mut self, deadline: DateTime<Utc>, transition: Transition) {
        self.queue.insert((deadline, self.seq), transition);
        self.seq += 1;
    }

    fn pop_due(&mut self, now: DateTime<Utc>) -> Option<Transition> {
        let entry = self.queue.first_entry()?;
        if entry.key().0 <= now {
            Some(entry.remove())
        } else {
            None
        }
    }

    fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }
}

fn delta(duration: Duration) -> TimeDelta {
    TimeDelta::from_std(duration).unwrap_or(TimeDelta::MAX)
}

#[derive(Debug, Clone)]
pub struct ChatStore {
    config: ChatConfig,
    me: User,
    conversations: Vec<Conversation>,
    histories: HashMap<ConversationId, Vec<Message>>,
    active: ConversationId,
    search: String,
    next_id: u64,
    timeline: Timeline,
}

impl ChatStore {
    pub fn new(config: ChatConfig, seed: Seed) -> Self {
        let mut histories: HashMap<ConversationId, Vec<Message>> = HashMap::new();
        let next_id = seed.messages.iter().map(|m| m.id.0).max().unwrap_or(0) + 1;
        for message in seed.messages {
            if seed
                .conversations
                .iter()
                .any(|c| c.id == message.conversation_id)
            {
                histories
                    .entry(message.conversation_id.clone())
                    .or_default()
                    .push(message);
            }
        }
        let active = config.initial_conversation.clone();
        let mut store = ChatStore {
            me: seed.me,
            conversations: seed.conversations,
            histories,
            active: active.clone(),
            search: String::new(),
            next_id,
            timeline: Timeline::default(),
            config,
        };
        store.select_conversation(active);
        store
    }

    pub fn is_mine(&self, message: &Message) -> bool {
        message.sender_id == self.me.id
    }

    pub fn active_id(&self) -> &ConversationId {
        &self.active
    }

    pub fn select_conversation(&mut self, id: ConversationId) {
        if let Some(conversation) = self.conversations.iter_mut().find(|c| c.id == id) {
            conversation.unread_count = 0;
        }
        self.active = id;
    }

    /// Appends a message built from `draft` to the active conversation and
    /// schedules its delivered and read transitions. Returns `None` when the
    /// draft is not sendable or no existing conversation is active.
    pub fn send(&mut self, draft: MessageDraft, now: DateTime<Utc>) -> Option<MessageId> {
        if !draft.is_sendable() {
            return None;
        }
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == self.active)?;

        let id = MessageId(self.next_id);
        self.next_id += 1;

        let message = Message {
            id,
            conversation_id: conversation.id.clone(),
            sender_id: self.me.id.clone(),
            text: draft.text,
            payload: draft.payload,
            timestamp: now,
            status: MessageStatus::Sent,
        };

        conversation.last_message = match (message.text(), &message.payload) {
            (Some(text), _) => text.to_owned(),
            (None, Payload::Voice { .. }) => self.config.voice_label.clone(),
            (None, _) => self.config.file_label.clone(),
        };
        conversation.last_message_time = now;

        let [delivered_after, read_after] = self.config.status_delays();
        for (after, status) in [
            (delivered_after, MessageStatus::Delivered),
            (read_after, MessageStatus::Read),
        ] {
            let Some(deadline) = now.checked_add_signed(delta(after)) else {
                continue;
            };
            self.timeline.schedule(
                deadline,
                Transition {
                    conversation: conversation.id.clone(),
                    message: id,
                    status,
                },
            );
        }

        self.histories
            .entry(conversation.id.clone())
            .or_default()
            .push(message);
        Some(id)
    }

    /// Applies every pending transition due at `now`, earliest first.
    /// Returns the number of messages whose status moved.
    pub fn apply_due(&mut self, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        while let Some(transition) = self.timeline.pop_due(now) {
            let message = self
                .histories
                .get_mut(&transition.conversation)
                .and_then(|history| history.iter_mut().find(|m| m.id == transition.message));
            if let Some(message) = message {
                if transition.status > message.status {
                    message.status = transition.status;
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timeline.next_deadline()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    /// Conversations whose other participant's name contains the search
    /// text, ignoring case. Seed order is kept.
    pub fn filtered_conversations(&self) -> Vec<&Conversation> {
        let needle = self.search.to_lowercase();
        self.conversations
            .iter()
            .filter(|conversation| {
                conversation
                    .other(&self.me.id)
                    .map_or(false, |other| other.name.to_lowercase().contains(&needle))
            })
            .collect()
    }

    pub fn conversation(&self, id: &ConversationId) -> Option<&Conversation> {
        self.conversations.iter().find(|c| &c.id == id)
    }

    pub fn messages(&self, id: &ConversationId) -> &[Message] {
        self.histories.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.histories
            .values()
            .flat_map(|history| history.iter())
            .find(|m| m.id == id)
    }

    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.conversation(&self.active)
    }

    pub fn active_messages(&self) -> &[Message] {
        self.messages(&self.active)
    }

    pub fn other_participant(&self) -> Option<&User> {
        self.active_conversation()?.other(&self.me.id)
    }

    pub fn local_id(&self) -> &UserId {
        &self.me.id
    }
}
