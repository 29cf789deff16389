//! Wire types shared with the haven backend

use serde::{Deserialize, Serialize};

/// Who authored a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in the conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A property the user has saved, locally or on their account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedProperty {
    pub name: String,
    pub url: String,
    pub contacted: bool,
    pub property_tag: String,
}

/// Request body for the streaming chat endpoints.
///
/// The backend expects the full history, including the new user turn, under
/// the `message` key.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a [Turn],
}

/// Body for endpoints that take a single property URL under `text`
#[derive(Debug, Serialize)]
pub struct PropertyRequest<'a> {
    pub text: &'a str,
}

/// Response from `lookup_property`
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyLookup {
    pub property: String,
    pub property_tag: String,
}

/// Response from `get_saved_properties`
#[derive(Debug, Deserialize)]
pub struct SavedPropertiesResponse {
    pub properties: Vec<SavedProperty>,
}

/// Request body for `contact_agent`.
///
/// `text` is always empty; the backend keys the enquiry off `url`.
#[derive(Debug, Serialize)]
pub struct ContactRequest<'a> {
    pub text: &'a str,
    pub name: &'a str,
    pub number: &'a str,
    pub message: &'a str,
    pub url: &'a str,
}

/// Credentials for `login` and `register`
#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// One-time code confirmation for `verify`
#[derive(Debug, Serialize)]
pub struct VerifyRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

/// Transcription result from `sst`
#[derive(Debug, Deserialize)]
pub struct Transcription {
    pub text: String,
}

/// Error body the backend sends with non-2xx statuses
#[derive(Debug, Deserialize)]
pub struct ServerMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_serializes_with_snake_case_role() {
        let json = serde_json::to_string(&Turn::user("hello")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
        let json = serde_json::to_string(&Turn::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_chat_request_wraps_history_under_message() {
        let history = vec![Turn::user("flats in Camden")];
        let json = serde_json::to_value(ChatRequest { message: &history }).unwrap();
        assert_eq!(json["message"][0]["role"], "user");
        assert_eq!(json["message"][0]["content"], "flats in Camden");
    }

    #[test]
    fn test_saved_property_round_trip() {
        let raw = r#"{"name":"2 bed flat, Camden","url":"https://www.dexters.co.uk/p/1","contacted":false,"property_tag":"/property/abc"}"#;
        let p: SavedProperty = serde_json::from_str(raw).unwrap();
        assert_eq!(p.name, "2 bed flat, Camden");
        assert!(!p.contacted);
        assert_eq!(serde_json::to_string(&p).unwrap(), raw);
    }
}
