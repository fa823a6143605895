//! Current date and time.

use chrono::Utc;
use dcore::{Tool, ToolOutput};
use schemars::JsonSchema;

/// Takes no arguments.
#[derive(JsonSchema)]
#[allow(dead_code)]
struct NoArgs {}

/// The `current_date` tool.
pub struct CurrentDate;

impl CurrentDate {
    pub fn tool() -> Tool {
        Tool {
            name: "current_date".into(),
            description: "Get the current date and time in UTC (RFC 3339).".into(),
            parameters: schemars::schema_for!(NoArgs),
            strict: false,
        }
    }

    /// The current UTC time, e.g. `2026-10-18T09:30:00.123456+00:00`.
    pub fn now() -> String {
        Utc::now().to_rfc3339()
    }

    /// Tool entry point. Arguments are ignored.
    pub async fn call(_arguments: &str) -> ToolOutput {
        Ok(Self::now())
    }
}
