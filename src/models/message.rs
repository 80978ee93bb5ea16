use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::Identity;

/// Frame sent by a client.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub message: String,
}

/// Frame delivered to every member of the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub name: String,
    pub avatar_url: String,
    pub message: String,
    pub when: DateTime<Utc>,
}

impl ChatMessage {
    pub fn from_sender(sender: &Identity, message: String) -> Self {
        Self {
            name: sender.name.clone(),
            avatar_url: sender.avatar_url.clone(),
            message,
            when: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_wire_shape() {
        let sender = Identity {
            user_id: "u1".to_string(),
            name: "alice".to_string(),
            avatar_url: "//www.gravatar.com/avatar/abc".to_string(),
        };
        let msg = ChatMessage::from_sender(&sender, "hello".to_string());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["name"], "alice");
        assert_eq!(json["avatar_url"], "//www.gravatar.com/avatar/abc");
        assert_eq!(json["message"], "hello");
        assert!(json["when"].is_string());
    }

    #[test]
    fn test_incoming_message_requires_message_field() {
        assert!(serde_json::from_str::<IncomingMessage>(r#"{"message":"hi"}"#).is_ok());
        assert!(serde_json::from_str::<IncomingMessage>(r#"{"text":"hi"}"#).is_err());
    }
}
