//! Identification engine: the Gemini-backed client, the transport seam under
//! it, image encoding, and the session controller that ties them to the view
//! state.

pub mod client;
pub mod config;
pub mod controller;
pub mod encoding;
pub mod gemini;
pub mod prompts;
pub mod share;
pub mod transport;

pub use client::{parse_identification, parse_similar_species, IdentificationClient, Identifier};
pub use config::ClientConfig;
pub use controller::SessionController;
pub use gemini::GeminiTransport;
pub use share::{FileShareSink, ShareSink, UnsupportedShare};
pub use transport::{GenerateRequest, GenerateResponse, ModelTransport, OutputMode, RequestPart};
