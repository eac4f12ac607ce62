use crate::state::ConversationId;
use std::time::Duration;

pub const VOICE_LABEL: &str = "🎤 Voice message";
pub const FILE_LABEL: &str = "📎 File";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid query {0}")]
    Query(#[from] url::ParseError),

    #[error("Unexpected param {0}: {1}")]
    UnexpectedParam(String, String),

    #[error("Bad number for {0}: {1}")]
    BadNumber(String, std::num::ParseIntError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    pub initial_conversation: ConversationId,
    pub delivered_after: Duration,
    pub read_after: Duration,
    pub voice_label: String,
    pub file_label: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            initial_conversation: "c1".into(),
            delivered_after: Duration::from_millis(1000),
            read_after: Duration::from_millis(2500),
            voice_label: VOICE_LABEL.to_owned(),
            file_label: FILE_LABEL.to_owned(),
        }
    }
}

impl ChatConfig {
    /// Defaults overridden by the page query string, e.g.
    /// `?conversation=c3&delivered_ms=200&read_ms=600`. Parameters that
    /// cannot be applied are skipped and handed back for logging.
    pub fn from_search(search: &str) -> (Self, Vec<Error>) {
        let mut config = ChatConfig::default();
        let mut errors = vec![];
        let url = match url::Url::parse(&format!("http://localhost/{search}")) {
            Ok(url) => url,
            Err(err) => return (config, vec![err.into()]),
        };
        for (key, value) in url.query_pairs() {
            match &key[..] {
                "conversation" => config.initial_conversation = ConversationId(value.to_string()),
                "delivered_ms" => match value.parse() {
                    Ok(ms) => config.delivered_after = Duration::from_millis(ms),
                    Err(err) => errors.push(Error::BadNumber(key.to_string(), err)),
                },
                "read_ms" => match value.parse() {
                    Ok(ms) => config.read_after = Duration::from_millis(ms),
                    Err(err) => errors.push(Error::BadNumber(key.to_string(), err)),
                },
                string => errors.push(Error::UnexpectedParam(string.to_owned(), value.to_string())),
            }
        }
        (config, errors)
    }

    /// Timer delays to arm after a send, in firing order. Read never fires
    /// before delivered.
    pub fn status_delays(&self) -> [Duration; 2] {
        [self.delivered_after, self.read_after.max(self.delivered_after)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let (config, errors) = ChatConfig::from_search("");
        assert!(errors.is_empty());
        assert_eq!(config, ChatConfig::default());
        assert_eq!(
            config.status_delays(),
            [Duration::from_millis(1000), Duration::from_millis(2500)]
        );
    }

    #[test]
    fn overrides() {
        let (config, errors) =
            ChatConfig::from_search("?conversation=c3&delivered_ms=10&read_ms=20");
        assert!(errors.is_empty());
        assert_eq!(config.initial_conversation, ConversationId::from("c3"));
        assert_eq!(config.delivered_after, Duration::from_millis(10));
        assert_eq!(config.read_after, Duration::from_millis(20));
    }

    #[test]
    fn malformed_values_keep_defaults() {
        let (config, errors) = ChatConfig::from_search("?delivered_ms=soon&theme=dark");
        assert_eq!(config.delivered_after, Duration::from_millis(1000));
        assert_eq!(config.read_after, Duration::from_millis(2500));
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], Error::BadNumber(ref key, _) if key == "delivered_ms"));
        assert_eq!(errors[1].to_string(), "Unexpected param theme: dark");
    }

    #[test]
    fn read_never_precedes_delivered() {
        let (config, _) = ChatConfig::from_search("?delivered_ms=3000");
        assert_eq!(config.status_delays(), [Duration::from_millis(3000); 2]);

        let config = ChatConfig {
            delivered_after: Duration::from_millis(900),
            read_after: Duration::from_millis(100),
            ..ChatConfig::default()
        };
        assert_eq!(config.status_delays(), [Duration::from_millis(900); 2]);
    }
}
