//! Model gateway implementations.
//!
//! [`HttpProvider`] is the shared OpenAI-compatible transport and
//! [`OpenRouter`] the provider every agent talks to by default.

pub use http::{HttpProvider, parse_response};
pub use openrouter::{OPENROUTER_ENDPOINT, OpenRouter, ProviderConfig};
pub use request::Request;
pub use reqwest::{self, Client};

mod http;
mod openrouter;
mod request;
