//! Wire types for the site publishing API

use serde::{Deserialize, Deserializer, Serialize};

/// Identity of the token owner, from `GET /api/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A published site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    #[serde(alias = "projectName")]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub owner: String,
}

/// Metadata for one local file, sent when diffing or publishing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Site-relative, slash-separated path
    pub path: String,
    pub size: u64,
    /// Hex SHA-1 of the file bytes
    #[serde(alias = "contentHash")]
    pub sha: String,
}

/// Counts reported alongside a sync diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncSummary {
    pub to_upload: usize,
    pub to_update: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

/// Server-side diff of a local file set against the stored site state.
///
/// Path lists accept either bare strings or objects carrying a `path` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    #[serde(default, deserialize_with = "path_list")]
    pub to_upload: Vec<String>,
    #[serde(default, deserialize_with = "path_list")]
    pub to_update: Vec<String>,
    #[serde(default, deserialize_with = "path_list")]
    pub deleted: Vec<String>,
    #[serde(default, deserialize_with = "path_list")]
    pub unchanged: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<SyncSummary>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathEntry {
    Bare(String),
    Record { path: String },
}

fn path_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Option::<Vec<PathEntry>>::deserialize(deserializer)?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|entry| match entry {
            PathEntry::Bare(path) | PathEntry::Record { path } => path,
        })
        .collect())
}

/// A short-lived, single-use authorization to upload one file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDirective {
    pub path: String,
    pub upload_url: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// Result of a batch delete. Not-found paths are reported, not raised.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeleteResponse {
    pub deleted: Vec<String>,
    pub not_found: Vec<String>,
}

// Response envelopes

#[derive(Deserialize)]
pub(crate) struct SiteEnvelope {
    pub site: Site,
}

#[derive(Deserialize)]
pub(crate) struct DirectivesEnvelope {
    #[serde(default)]
    pub files: Vec<UploadDirective>,
}
