//! Backend abstraction for streaming chat responses.

use async_trait::async_trait;
use haven_api::{ApiClient, TextFragmentStream, Turn};

/// Source of streamed chat responses.
///
/// `history` is the full transcript, the newest user turn last. The returned
/// stream yields decoded text fragments in order; an `Err` item is terminal.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn stream_chat(
        &self,
        history: &[Turn],
        personalized: bool,
    ) -> haven_api::Result<TextFragmentStream>;
}

/// The real backend, speaking HTTP through [`ApiClient`]
pub struct HttpBackend {
    client: ApiClient,
}

impl HttpBackend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn stream_chat(
        &self,
        history: &[Turn],
        personalized: bool,
    ) -> haven_api::Result<TextFragmentStream> {
        if personalized {
            self.client.personalized_chat(history).await
        } else {
            self.client.chat(history).await
        }
    }
}
