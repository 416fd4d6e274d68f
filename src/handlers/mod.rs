//! Tool handlers
//!
//! Implementations of MCP tool handlers that shell out to the nix CLI.

pub mod nix_ops;

use crate::error::Result;
use serde::Serialize;
use serde_json::{json, Value};

/// Wrap a serializable tool response as a single MCP text content item.
///
/// The response body is rendered as indented JSON so callers (and humans
/// reading transcripts) get a stable, readable shape.
pub(crate) fn text_result<T: Serialize>(response: &T) -> Result<Value> {
    let text = serde_json::to_string_pretty(response)?;
    Ok(text_content(text))
}

/// Build an MCP `tools/call` result carrying one text item.
pub(crate) fn text_content(text: impl Into<String>) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": text.into()
            }
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_content_shape() {
        let value = text_content("hello");
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "hello");
    }

    #[test]
    fn test_text_result_is_indented_json() {
        #[derive(Serialize)]
        struct Body {
            success: bool,
        }

        let value = text_result(&Body { success: true }).unwrap();
        let text = value["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("\n"));
        assert_eq!(
            serde_json::from_str::<Value>(text).unwrap(),
            json!({"success": true})
        );
    }
}
