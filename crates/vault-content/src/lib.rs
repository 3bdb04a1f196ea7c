//! Note content parsing for the vault publisher
//!
//! Reads the pieces of a markdown note the publisher cares about: the YAML
//! front matter (publish opt-out, cover image) and the embedded resources
//! referenced from the body.

pub mod embeds;
pub mod error;
pub mod frontmatter;
pub mod note;

pub use embeds::{extract_embeds, is_external_link};
pub use error::{Error, Result};
pub use frontmatter::{FrontMatter, parse_front_matter, split_front_matter};
pub use note::Note;
