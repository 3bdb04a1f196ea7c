//! Classification of local files against a remote diff

use std::collections::HashSet;

use serde::Serialize;
use vault_client::SyncResponse;

use crate::vault::VaultFile;

/// Where a [`PublishStatus`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    /// Diffed against the remote site
    Remote,
    /// The site has never been created; everything is new
    NoSite,
    /// The remote could not be queried; everything is reported as new
    Unreachable,
}

/// Partition of the publishable local files plus remote-only paths.
///
/// Every publishable local file is in exactly one of `unchanged`, `changed`
/// and `new_files`. `deleted` holds site paths with no local counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishStatus {
    pub unchanged: Vec<VaultFile>,
    pub changed: Vec<VaultFile>,
    pub new_files: Vec<VaultFile>,
    pub deleted: Vec<String>,
    pub source: StatusSource,
}

impl PublishStatus {
    /// Every file is new and nothing is deleted.
    pub fn all_new(files: Vec<VaultFile>, source: StatusSource) -> Self {
        Self {
            unchanged: Vec::new(),
            changed: Vec::new(),
            new_files: files,
            deleted: Vec::new(),
            source,
        }
    }

    /// Whether publishing would change anything.
    pub fn has_differences(&self) -> bool {
        !self.changed.is_empty() || !self.new_files.is_empty() || !self.deleted.is_empty()
    }

    pub fn local_count(&self) -> usize {
        self.unchanged.len() + self.changed.len() + self.new_files.len()
    }
}

/// Classify local files by membership in the remote diff.
///
/// `local` pairs each file with its site-relative path. A file listed as
/// unchanged stays unchanged even if the server also lists it elsewhere;
/// files the server does not mention at all are new.
pub fn classify(local: Vec<(VaultFile, String)>, response: &SyncResponse) -> PublishStatus {
    let unchanged: HashSet<&str> = response.unchanged.iter().map(|p| site_path(p)).collect();
    let to_update: HashSet<&str> = response.to_update.iter().map(|p| site_path(p)).collect();
    let seen: HashSet<String> = local.iter().map(|(_, path)| path.clone()).collect();

    let mut status = PublishStatus::all_new(Vec::new(), StatusSource::Remote);
    for (file, path) in local {
        if unchanged.contains(path.as_str()) {
            status.unchanged.push(file);
        } else if to_update.contains(path.as_str()) {
            status.changed.push(file);
        } else {
            status.new_files.push(file);
        }
    }

    let mut reported = HashSet::new();
    for path in &response.deleted {
        let path = site_path(path);
        if !seen.contains(path) && reported.insert(path) {
            status.deleted.push(path.to_string());
        }
    }

    status
}

fn site_path(path: &str) -> &str {
    path.trim_start_matches('/')
}
