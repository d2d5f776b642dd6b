use serde::{Deserialize, Serialize};

/// One archived chat message.
///
/// Only the fields we keep are declared; everything else the API sends is
/// dropped on deserialization. Serializing a `Message` yields exactly the
/// line stored in a monthly bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub author: Author,
    #[serde(default)]
    pub content: String,
    pub timestamp: String,
    #[serde(default)]
    pub edited_timestamp: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub url: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Message {
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Guild channel as returned by the channel listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub position: i64,
}

impl Channel {
    pub const GUILD_TEXT: u8 = 0;

    pub fn is_text(&self) -> bool {
        self.kind == Self::GUILD_TEXT
    }
}

#[cfg(test)]
pub(crate) fn test_message(id: &str, timestamp: &str) -> Message {
    Message {
        id: id.to_string(),
        author: Author {
            id: "7".to_string(),
            username: "alice".to_string(),
        },
        content: format!("message {}", id),
        timestamp: timestamp.to_string(),
        edited_timestamp: None,
        attachments: vec![],
        embeds: vec![],
    }
}
