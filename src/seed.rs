//! Static demo data loaded at start-up. Everything resets on reload.

use crate::state::{Conversation, Message, MessageId, MessageStatus, Payload, User};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

pub struct Seed {
    pub me: User,
    pub conversations: Vec<Conversation>,
    pub messages: Vec<Message>,
}

/// Local wall-clock time on a February 2026 day.
fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2026, 2, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_default()
}

fn contact(id: &str, name: &str, online: bool) -> User {
    User {
        id: id.into(),
        name: name.to_owned(),
        online,
    }
}

pub fn load() -> Seed {
    let me = contact("me", "You", true);
    let contacts = [
        contact("u1", "Priya Sharma", true),
        contact("u2", "Arjun Patel", false),
        contact("u3", "Sneha Gupta", true),
        contact("u4", "Rahul Verma", false),
        contact("u5", "Ananya Das", true),
        contact("u6", "Vikram Singh", false),
    ];

    let summaries = [
        ("c1", "Hey, did you finish the project?", at(16, 10, 30), 2),
        ("c2", "Let's catch up tomorrow 👋", at(16, 9, 15), 0),
        ("c3", "The design looks great!", at(15, 22, 45), 1),
        ("c4", "Can you send me the files?", at(15, 18, 10), 0),
        ("c5", "Meeting at 3pm confirmed ✅", at(15, 14, 0), 3),
        ("c6", "Thanks for the help!", at(14, 20, 30), 0),
    ];
    let conversations = summaries
        .into_iter()
        .zip(contacts)
        .map(|((id, last, time, unread), other)| Conversation {
            id: id.into(),
            participants: [me.clone(), other],
            last_message: last.to_owned(),
            last_message_time: time,
            unread_count: unread,
        })
        .collect();

    use MessageStatus::{Delivered, Read};
    let history = [
        ("c1", "u1", "Hi! How's the project going?", at(16, 10, 0), Read),
        ("c1", "me", "Going well! Almost done with the frontend 🚀", at(16, 10, 5), Read),
        ("c1", "u1", "That's awesome! Can you share a preview?", at(16, 10, 10), Read),
        ("c1", "me", "Sure, let me push the latest changes first", at(16, 10, 15), Delivered),
        ("c1", "u1", "Hey, did you finish the project?", at(16, 10, 30), Delivered),
        ("c2", "me", "Hey Arjun!", at(16, 9, 0), Read),
        ("c2", "u2", "Hey! What's up?", at(16, 9, 5), Read),
        ("c2", "me", "Wanted to discuss the API integration", at(16, 9, 10), Read),
        ("c2", "u2", "Let's catch up tomorrow 👋", at(16, 9, 15), Read),
        ("c3", "u3", "Check out this new design I made!", at(15, 22, 30), Read),
        ("c3", "me", "Wow, that looks incredible! 😍", at(15, 22, 35), Read),
        ("c3", "u3", "The design looks great!", at(15, 22, 45), Delivered),
        ("c4", "u4", "Can you send me the files?", at(15, 18, 10), Read),
        ("c5", "u5", "Are we still on for the meeting?", at(15, 13, 50), Read),
        ("c5", "me", "Yes! 3pm works for me", at(15, 13, 55), Read),
        ("c5", "u5", "Meeting at 3pm confirmed ✅", at(15, 14, 0), Delivered),
        ("c6", "me", "Here's that code snippet you asked for", at(14, 20, 20), Read),
        ("c6", "u6", "Thanks for the help!", at(14, 20, 30), Read),
    ];
    let messages = history
        .into_iter()
        .zip(1..)
        .map(|((conversation, sender, text, timestamp, status), id)| Message {
            id: MessageId(id),
            conversation_id: conversation.into(),
            sender_id: sender.into(),
            text: Some(text.to_owned()),
            payload: Payload::Text,
            timestamp,
            status,
        })
        .collect();

    Seed {
        me,
        conversations,
        messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_consistent() {
        let seed = load();
        assert_eq!(seed.conversations.len(), 6);
        assert_eq!(seed.messages.len(), 18);
        for conversation in &seed.conversations {
            assert_eq!(conversation.participants[0], seed.me);
            let last = seed
                .messages
                .iter()
                .filter(|m| m.conversation_id == conversation.id)
                .last()
                .unwrap();
            assert_eq!(last.text(), Some(conversation.last_message.as_str()));
            assert_eq!(last.timestamp, conversation.last_message_time);
        }
        let ids: Vec<u64> = seed.messages.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, (1..=18).collect::<Vec<_>>());
    }
}
