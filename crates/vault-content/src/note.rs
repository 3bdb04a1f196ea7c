//! Parsed view of a markdown note

use crate::{FrontMatter, Result, embeds, frontmatter};

/// The publish-relevant parts of a markdown note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub front_matter: Option<FrontMatter>,
    /// Embed targets found in the body, in document order
    pub embeds: Vec<String>,
}

impl Note {
    /// Parse a note's source text.
    ///
    /// Embeds are only collected from the body; front matter values such as
    /// `image` are exposed through [`Note::image_link`].
    pub fn parse(text: &str) -> Result<Self> {
        let front_matter = frontmatter::parse_front_matter(text)?;
        let body = match frontmatter::split_front_matter(text) {
            Some((_, body)) => body,
            None => text,
        };

        Ok(Self {
            front_matter,
            embeds: embeds::extract_embeds(body),
        })
    }

    pub fn is_publish_disabled(&self) -> bool {
        self.front_matter
            .as_ref()
            .is_some_and(FrontMatter::is_publish_disabled)
    }

    pub fn image_link(&self) -> Option<String> {
        self.front_matter.as_ref().and_then(FrontMatter::image_link)
    }
}
