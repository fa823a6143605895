//! Tools attached to delegate agents.
//!
//! Each tool exposes a [`Tool`](dcore::Tool) definition for the model's
//! catalog and an async `call` taking the raw JSON arguments the model sent.

pub use date::CurrentDate;
pub use document::{DocumentError, DocumentRequest, DocumentWriter};
pub use search::{DuckDuckGo, Search, SearchError, SearchHit, WebSearch};

mod date;
mod document;
mod search;
