//! JSON sidecar to text conversion.
//!
//! Nested values are flattened into dotted paths so every leaf can be traced
//! back to its place in the source document:
//!
//! ```text
//! node.owner.username: nasa
//! node.edge_media_to_caption.edges[0].node.text: Hello
//! ```
//!
//! A member name that would make the path ambiguous (it is empty, or holds
//! `.`, `[`, `]`, `"`, `:` or a control character) is written as a quoted JSON
//! string, e.g. `"a.b": 1` next to `a.b: 2`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::fs::paths::sidecar_text_path;

/// Key used when the document root is a scalar.
const ROOT_KEY: &str = "value";

/// Flattened view of one JSON sidecar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDocument {
    pub source: PathBuf,
    pub text_path: PathBuf,
    pub entries: Vec<(String, String)>,
}

impl MetadataDocument {
    /// Build a document from an already parsed value.
    pub fn from_value(source: &Path, value: &Value) -> Self {
        Self {
            source: source.to_path_buf(),
            text_path: sidecar_text_path(source),
            entries: flatten(value),
        }
    }

    /// Render as `key: value` lines.
    ///
    /// Multi-line strings continue on following lines indented by two spaces.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push_str(": ");
            let mut lines = value.split('\n');
            if let Some(first) = lines.next() {
                out.push_str(first);
            }
            for line in lines {
                out.push_str("\n  ");
                out.push_str(line);
            }
            out.push('\n');
        }
        out
    }
}

/// Flatten a JSON value into ordered `(path, rendered value)` pairs.
pub fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    match value {
        Value::Object(_) | Value::Array(_) => flatten_into("", value, &mut entries),
        scalar => entries.push((ROOT_KEY.to_string(), render_scalar(scalar))),
    }
    entries
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            if map.is_empty() && !prefix.is_empty() {
                out.push((prefix.to_string(), "{}".to_string()));
            }
            for (key, child) in map {
                let key = path_segment(key);
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(&path, child, out);
            }
        }
        Value::Array(items) => {
            if items.is_empty() && !prefix.is_empty() {
                out.push((prefix.to_string(), "[]".to_string()));
            }
            for (index, child) in items.iter().enumerate() {
                flatten_into(&format!("{}[{}]", prefix, index), child, out);
            }
        }
        scalar => out.push((prefix.to_string(), render_scalar(scalar))),
    }
}

fn path_segment(key: &str) -> String {
    let ambiguous = key.is_empty()
        || key
            .chars()
            .any(|c| matches!(c, '.' | '[' | ']' | '"' | ':') || c.is_control());
    if ambiguous {
        Value::String(key.to_string()).to_string()
    } else {
        key.to_string()
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Parse a JSON sidecar and write its flattened text next to it.
///
/// Any existing text file with the same base name is overwritten.
pub fn transcode_sidecar(json_path: &Path) -> Result<MetadataDocument> {
    let content = fs::read_to_string(json_path).map_err(|source| Error::FileUnreadable {
        path: json_path.to_path_buf(),
        source,
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|source| Error::MalformedMetadata {
            path: json_path.to_path_buf(),
            source,
        })?;

    let document = MetadataDocument::from_value(json_path, &value);
    fs::write(&document.text_path, document.render()).map_err(|source| {
        Error::OutputUnwritable {
            path: document.text_path.clone(),
            source,
        }
    })?;

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_simple() {
        let entries = flatten(&json!({"caption": "hi", "likes": 3}));
        assert_eq!(
            entries,
            vec![
                ("caption".to_string(), "hi".to_string()),
                ("likes".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_flatten_nested() {
        let value = json!({
            "node": {
                "owner": {"username": "nasa"},
                "tags": ["space", "moon"],
                "location": null,
                "is_video": false,
                "empty": {},
                "none": []
            }
        });
        let entries = flatten(&value);
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "node.owner.username",
                "node.tags[0]",
                "node.tags[1]",
                "node.location",
                "node.is_video",
                "node.empty",
                "node.none",
            ]
        );
        assert_eq!(entries[3].1, "null");
        assert_eq!(entries[4].1, "false");
        assert_eq!(entries[5].1, "{}");
        assert_eq!(entries[6].1, "[]");
    }

    #[test]
    fn test_flatten_scalar_root() {
        assert_eq!(
            flatten(&json!(42)),
            vec![("value".to_string(), "42".to_string())]
        );
        assert_eq!(
            flatten(&json!([1, {"a": 2}])),
            vec![
                ("[0]".to_string(), "1".to_string()),
                ("[1].a".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_ambiguous_keys_are_quoted() {
        let value = json!({"a.b": 1, "a": {"b": 2}, "x": {"line\nbreak": true, "": null}});
        let entries = flatten(&value);
        assert_eq!(
            entries,
            vec![
                ("\"a.b\"".to_string(), "1".to_string()),
                ("a.b".to_string(), "2".to_string()),
                ("x.\"line\\nbreak\"".to_string(), "true".to_string()),
                ("x.\"\"".to_string(), "null".to_string()),
            ]
        );

        // Every entry still renders on a single line
        let document = MetadataDocument {
            source: PathBuf::from("p.json"),
            text_path: PathBuf::from("p.txt"),
            entries,
        };
        assert_eq!(document.render().lines().count(), 4);
    }

    #[test]
    fn test_render_multiline() {
        let doc = MetadataDocument::from_value(
            Path::new("post.json"),
            &json!({"caption": "first\nsecond", "likes": 1}),
        );
        assert_eq!(doc.render(), "caption: first\n  second\nlikes: 1\n");
        assert_eq!(doc.text_path, PathBuf::from("post.txt"));
    }

    #[test]
    fn test_transcode_writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("b.json");
        fs::write(&json_path, r#"{"caption":"hi","likes":3}"#).unwrap();

        let doc = transcode_sidecar(&json_path).unwrap();
        let text = fs::read_to_string(dir.path().join("b.txt")).unwrap();
        assert_eq!(text, "caption: hi\nlikes: 3\n");
        assert_eq!(doc.entries.len(), 2);
    }

    #[test]
    fn test_transcode_is_idempotent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("post.json");
        let txt_path = dir.path().join("post.txt");
        fs::write(&json_path, r#"{"z":1,"a":{"b":[true]}}"#).unwrap();
        fs::write(&txt_path, "old caption file").unwrap();

        transcode_sidecar(&json_path).unwrap();
        let first = fs::read(&txt_path).unwrap();
        transcode_sidecar(&json_path).unwrap();
        let second = fs::read(&txt_path).unwrap();

        assert_eq!(first, second);
        assert_eq!(String::from_utf8(first).unwrap(), "z: 1\na.b[0]: true\n");
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("c.json");
        fs::write(&json_path, "{invalid").unwrap();

        let err = transcode_sidecar(&json_path).unwrap_err();
        assert!(matches!(err, Error::MalformedMetadata { .. }));
        assert!(!dir.path().join("c.txt").exists());
    }
}
