//! haven-api: typed client for the haven real-estate backend
//!
//! Wraps every backend endpoint in a typed method and decodes the streamed
//! chat body into ordered UTF-8 text fragments.

pub mod client;
pub mod decode;
pub mod error;
pub mod types;

pub use client::{ApiClient, TextFragmentStream};
pub use decode::Utf8Decoder;
pub use error::{Error, Result};
pub use types::*;
