use std::path::Path;

use anyhow::{Context, Result};

use crate::models::HighlightsContext;

/// Load a pipeline context from a JSON file
pub fn load_context(path: &Path) -> Result<HighlightsContext> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_context_json(&content)
}

/// Parse a pipeline context from a JSON string
pub fn parse_context_json(json: &str) -> Result<HighlightsContext> {
    serde_json::from_str(json).context("Failed to parse context JSON")
}
