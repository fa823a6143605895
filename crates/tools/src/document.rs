//! Legal document rendering.
//!
//! Documents are written as standalone HTML files under a fixed output
//! directory. Only the final component of the requested filename is kept,
//! so a model cannot write outside that directory.

use chrono::Utc;
use dcore::{Tool, ToolError, ToolOutput};
use schemars::JsonSchema;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Arguments of the `write_document` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DocumentRequest {
    /// Document title, e.g. "Non-Disclosure Agreement".
    pub title: String,
    /// HTML body of the document (sections, paragraphs, lists).
    pub content: String,
    /// Output file name. Must end with `.html`.
    pub filename: String,
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("content cannot be empty")]
    EmptyContent,

    #[error("filename must end with .html: {0}")]
    BadFilename(String),

    #[error("failed to write document: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes rendered documents into `output_dir`.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    output_dir: PathBuf,
}

impl DocumentWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn tool() -> Tool {
        Tool {
            name: "write_document".into(),
            description: "Render a legal document to an HTML file and return its absolute path."
                .into(),
            parameters: schemars::schema_for!(DocumentRequest),
            strict: false,
        }
    }

    /// Validate, render and write the document. Returns the absolute path.
    pub fn write(&self, request: &DocumentRequest) -> Result<PathBuf, DocumentError> {
        if request.title.trim().is_empty() {
            return Err(DocumentError::EmptyTitle);
        }
        if request.content.trim().is_empty() {
            return Err(DocumentError::EmptyContent);
        }
        let name = Path::new(&request.filename)
            .file_name()
            .filter(|name| name.to_string_lossy().to_lowercase().ends_with(".html"))
            .ok_or_else(|| DocumentError::BadFilename(request.filename.clone()))?;

        tracing::info!(filename = %request.filename, "generating document");
        fs::create_dir_all(&self.output_dir)?;
        let path = std::path::absolute(self.output_dir.join(name))?;
        let date = Utc::now().format("%B %d, %Y").to_string();
        fs::write(&path, render(&request.title, &date, &request.content))?;
        tracing::info!(path = %path.display(), "document generated");
        Ok(path)
    }

    /// Tool entry point over raw JSON arguments.
    pub async fn call(&self, arguments: &str) -> ToolOutput {
        let request: DocumentRequest =
            serde_json::from_str(arguments).map_err(ToolError::invalid_arguments)?;
        match self.write(&request) {
            Ok(path) => Ok(path.display().to_string()),
            Err(e @ DocumentError::Io(_)) => Err(ToolError::execution(e)),
            Err(e) => Err(ToolError::invalid_arguments(e)),
        }
    }
}

fn render(title: &str, date: &str, content: &str) -> String {
    let title = escape(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: "Times New Roman", serif; margin: 2.5cm; line-height: 1.5; }}
  h1 {{ text-align: center; text-transform: uppercase; font-size: 16pt; }}
  .date {{ text-align: right; font-style: italic; margin-bottom: 2em; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p class="date">{date}</p>
{content}
</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_title_only() {
        let html = render("A & B <Co>", "May 01, 2026", "<p>body</p>");
        assert!(html.contains("<h1>A &amp; B &lt;Co&gt;</h1>"));
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("May 01, 2026"));
    }
}
