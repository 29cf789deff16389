//! HTTP client for the haven backend.
//!
//! Every endpoint lives under `/api` on a single base URL. The two chat
//! endpoints stream their response body as raw UTF-8 text; everything else is
//! plain JSON. The backend tracks the login session with a cookie, so one
//! client instance is shared for the life of the process.

use std::path::Path;
use std::pin::Pin;

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::decode::Utf8Decoder;
use crate::error::{Error, Result};
use crate::types::{
    ChatRequest, ContactRequest, Credentials, PropertyLookup, PropertyRequest,
    SavedPropertiesResponse, SavedProperty, ServerMessage, Transcription, Turn, VerifyRequest,
};

/// Lazy, finite stream of decoded text fragments from a chat response.
///
/// Fragments arrive in order; an `Err` item is terminal. The stream is not
/// restartable, a retry means a new request.
pub type TextFragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Client for the haven backend
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(Error::Http)?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/api/{}", self.base_url, name)
    }

    /// The backend origin, used to build shareable property links
    pub fn origin(&self) -> &str {
        &self.base_url
    }

    // --- streaming chat ---

    /// Submit the full history (newest user turn last) and stream the reply
    pub async fn chat(&self, history: &[Turn]) -> Result<TextFragmentStream> {
        self.stream_chat("chat", history).await
    }

    /// Same contract as [`ApiClient::chat`] against the personalized endpoint
    pub async fn personalized_chat(&self, history: &[Turn]) -> Result<TextFragmentStream> {
        self.stream_chat("personalized_chat", history).await
    }

    async fn stream_chat(&self, name: &str, history: &[Turn]) -> Result<TextFragmentStream> {
        tracing::debug!(endpoint = name, turns = history.len(), "chat request");
        let response = self
            .client
            .post(self.endpoint(name))
            .json(&ChatRequest { message: history })
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(Box::pin(decode_body(response)))
    }

    // --- properties ---

    /// Resolve a listing URL to its display name and share tag
    pub async fn lookup_property(&self, url: &str) -> Result<PropertyLookup> {
        self.post_json("lookup_property", &PropertyRequest { text: url })
            .await
    }

    /// Fetch the account's saved properties, most recently saved first
    pub async fn get_saved_properties(&self) -> Result<Vec<SavedProperty>> {
        let response = self
            .client
            .get(self.endpoint("get_saved_properties"))
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: SavedPropertiesResponse = response.json().await?;
        Ok(body.properties)
    }

    /// Save a listing URL to the account
    pub async fn save_property(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("save_property"))
            .json(&PropertyRequest { text: url })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Remove a listing URL from the account
    pub async fn delete_property(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint("delete_property"))
            .json(&PropertyRequest { text: url })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Send an agent enquiry for a listing
    pub async fn contact_agent(
        &self,
        name: &str,
        number: &str,
        message: &str,
        url: &str,
    ) -> Result<()> {
        let body = ContactRequest {
            text: "",
            name,
            number,
            message,
            url,
        };
        let response = self
            .client
            .post(self.endpoint("contact_agent"))
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    // --- auth ---

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("login"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("register"))
            .json(&Credentials { email, password })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Confirm the one-time code emailed after registration
    pub async fn verify(&self, email: &str, otp: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("verify"))
            .json(&VerifyRequest { email, otp })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    // --- speech to text ---

    /// Upload an audio file and return its transcription
    pub async fn speech_to_text(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Upload(format!("{}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.webm".to_string());
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(self.endpoint("sst"))
            .multipart(form)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: Transcription = response.json().await?;
        Ok(body.text)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, name: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(self.endpoint(name))
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Map non-2xx responses to a typed error carrying the server's `message`
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = match response.json::<ServerMessage>().await {
        Ok(body) => body.message,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    tracing::warn!(status = status.as_u16(), %message, "backend error");
    if status == reqwest::StatusCode::UNAUTHORIZED {
        Err(Error::AuthRequired(message))
    } else {
        Err(Error::server(status.as_u16(), message))
    }
}

/// Turn a streamed response body into decoded text fragments
fn decode_body(response: reqwest::Response) -> impl Stream<Item = Result<String>> {
    stream! {
        let mut decoder = Utf8Decoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            match chunk {
                Ok(chunk) => {
                    let mut text = String::new();
                    match decoder.feed(&chunk, &mut text) {
                        Ok(()) => {
                            if !text.is_empty() {
                                yield Ok(text);
                            }
                        }
                        Err(err) => {
                            // Fail soft: everything decoded so far still counts.
                            if !text.is_empty() {
                                yield Ok(text);
                            }
                            yield Err(err);
                            return;
                        }
                    }
                }
                Err(err) => {
                    yield Err(Error::Http(err));
                    return;
                }
            }
        }
        if let Err(err) = decoder.finish() {
            yield Err(err);
        }
    }
}
