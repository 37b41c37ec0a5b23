use serde::{Deserialize, Serialize};

/// One exchange unit in the assistant conversation history. Serialization
/// matches the Generative Language API wire format so turns can be sent
/// upstream verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub parts: Vec<ContentPart>,
}

impl ConversationTurn {
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self { role: TurnRole::User, parts }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            parts: vec![ContentPart::text(text)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// A unit of turn content: inline text, or a reference to a file previously
/// registered with the gateway's file API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    Text {
        text: String,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: FileRef,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    pub fn file(file_uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        ContentPart::File {
            file_data: FileRef {
                file_uri: file_uri.into(),
                mime_type: mime_type.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub file_uri: String,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_part_wire_shape() {
        let part = ContentPart::text("hello");
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json, serde_json::json!({ "text": "hello" }));
    }

    #[test]
    fn file_part_wire_shape() {
        let part = ContentPart::file("https://files.example/abc", "application/pdf");
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fileData": {
                    "fileUri": "https://files.example/abc",
                    "mimeType": "application/pdf",
                }
            })
        );
    }

    #[test]
    fn turn_roles_serialize_lowercase() {
        let turn = ConversationTurn::model("hi");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "model");
        assert_eq!(json["parts"][0]["text"], "hi");
    }

    #[test]
    fn untagged_parts_deserialize() {
        let turn: ConversationTurn = serde_json::from_value(serde_json::json!({
            "role": "user",
            "parts": [
                { "text": "look at this" },
                { "fileData": { "fileUri": "u", "mimeType": "image/png" } },
            ]
        }))
        .unwrap();
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.parts.len(), 2);
        assert!(matches!(turn.parts[1], ContentPart::File { .. }));
    }
}
