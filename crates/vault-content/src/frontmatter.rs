//! YAML front matter
//!
//! A note may open with a `---` delimited YAML block. The publisher reads two
//! keys from it: `publish` (a note with `publish: false` is never uploaded)
//! and `image` (a cover image published alongside the note). Everything else
//! is kept in [`FrontMatter::extra`] untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;

use crate::embeds::is_external_link;
use crate::{Error, Result};

/// Parsed front matter of a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Accepts booleans and the strings `"true"`/`"false"`; anything else
    /// leaves the note publishable.
    #[serde(default = "default_publish", deserialize_with = "lenient_publish")]
    pub publish: bool,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_publish() -> bool {
    true
}

fn lenient_publish<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::String(s) => !s.trim().eq_ignore_ascii_case("false"),
        _ => true,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            publish: true,
            title: None,
            image: None,
            extra: BTreeMap::new(),
        }
    }
}

impl FrontMatter {
    /// Whether the note opted out of publishing.
    pub fn is_publish_disabled(&self) -> bool {
        !self.publish
    }

    /// Vault link target of the cover image, if it points inside the vault.
    ///
    /// Handles both `image: cover.png` and the wiki form `image: "[[cover.png|Cover]]"`.
    pub fn image_link(&self) -> Option<String> {
        let raw = self.image.as_deref()?.trim();
        let raw = raw.strip_prefix('!').unwrap_or(raw);
        let raw = raw
            .strip_prefix("[[")
            .and_then(|r| r.strip_suffix("]]"))
            .unwrap_or(raw);
        let target = raw.split('|').next().unwrap_or(raw);
        let target = target.split('#').next().unwrap_or(target).trim();

        if target.is_empty() || is_external_link(target) {
            return None;
        }
        Some(target.to_string())
    }
}

/// Split a note into its raw front matter and body.
///
/// Returns `None` when the note has no front matter block or the block is
/// never closed.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let marker = line.trim_end_matches(['\r', '\n']);
        if marker == "---" || marker == "..." {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse the front matter of a note.
///
/// A note without front matter yields `Ok(None)`. An empty block yields the
/// default front matter.
///
/// # Errors
///
/// Returns [`Error::FrontMatter`] if the block is not a valid YAML mapping.
pub fn parse_front_matter(text: &str) -> Result<Option<FrontMatter>> {
    let Some((yaml, _)) = split_front_matter(text) else {
        return Ok(None);
    };
    if yaml.trim().is_empty() {
        return Ok(Some(FrontMatter::default()));
    }
    serde_yaml::from_str(yaml)
        .map(Some)
        .map_err(|e| Error::front_matter(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_returns_yaml_and_body() {
        let (yaml, body) = split_front_matter("---\ntitle: Hi\n---\nBody\n").unwrap();
        assert_eq!(yaml, "title: Hi\n");
        assert_eq!(body, "Body\n");
    }

    #[test]
    fn split_handles_crlf() {
        let (yaml, body) = split_front_matter("---\r\npublish: false\r\n---\r\nBody").unwrap();
        assert_eq!(yaml, "publish: false\r\n");
        assert_eq!(body, "Body");
    }

    #[test]
    fn split_requires_opening_marker_on_first_line() {
        assert!(split_front_matter("Intro\n---\ntitle: x\n---\n").is_none());
        assert!(split_front_matter("----\ntitle: x\n---\n").is_none());
    }

    #[test]
    fn unclosed_block_is_not_front_matter() {
        assert!(split_front_matter("---\ntitle: x\n").is_none());
    }

    #[test]
    fn publish_defaults_to_true() {
        let fm = parse_front_matter("---\ntitle: Hi\n---\n").unwrap().unwrap();
        assert!(fm.publish);
        assert_eq!(fm.title.as_deref(), Some("Hi"));
    }

    #[test]
    fn publish_accepts_string_false() {
        let fm = parse_front_matter("---\npublish: \"false\"\n---\n")
            .unwrap()
            .unwrap();
        assert!(fm.is_publish_disabled());
    }

    #[test]
    fn unknown_keys_are_kept() {
        let fm = parse_front_matter("---\ntags: [a, b]\n---\n").unwrap().unwrap();
        assert!(fm.extra.contains_key("tags"));
    }

    #[test]
    fn scalar_front_matter_is_an_error() {
        let err = parse_front_matter("---\njust a string\n---\n").unwrap_err();
        assert!(matches!(err, Error::FrontMatter { .. }));
    }

    #[test]
    fn image_link_strips_wiki_syntax() {
        let fm = FrontMatter {
            image: Some("[[assets/cover.png|Cover]]".into()),
            ..Default::default()
        };
        assert_eq!(fm.image_link().as_deref(), Some("assets/cover.png"));
    }

    #[test]
    fn image_link_ignores_urls() {
        let fm = FrontMatter {
            image: Some("https://example.com/cover.png".into()),
            ..Default::default()
        };
        assert_eq!(fm.image_link(), None);
    }
}
