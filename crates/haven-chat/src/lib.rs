//! haven-chat: streaming chat session engine
//!
//! This crate runs the conversation against the haven backend: one streaming
//! turn at a time with cooperative cancellation, a render cadence for partial
//! text, an append-only transcript, and the saved-property stores.

pub mod backend;
pub mod error;
pub mod events;
pub mod filter;
pub mod handle;
pub mod prompts;
pub mod session;
pub mod store;
pub mod transcript;

pub use backend::{ChatBackend, HttpBackend};
pub use error::{Error, Result};
pub use events::ChatEvent;
pub use filter::FilterDraft;
pub use handle::SessionHandle;
pub use session::{ChatSession, PERSONALIZED_MIN_TURNS, RENDER_TICK};
pub use store::{GUEST_COMPARE_LIMIT, LocalStore, PropertyStore, RemoteStore};
pub use transcript::Transcript;
