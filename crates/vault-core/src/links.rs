//! Wiki-link resolution over a vault file list
//!
//! Candidates are tried in order: the link as a vault path, the link relative
//! to the folder of the note it appears in, then any file whose path ends with
//! the link. Each step also tries the link with `.md` appended. When several
//! files match by suffix the shortest path wins.

use crate::vault::VaultFile;

fn find<'a>(files: &'a [VaultFile], path: &str) -> Option<&'a VaultFile> {
    files.iter().find(|file| file.path == path)
}

fn find_note<'a>(files: &'a [VaultFile], path: &str) -> Option<&'a VaultFile> {
    find(files, path).or_else(|| find(files, &format!("{}.md", path)))
}

/// Strip alias, anchor, escapes and leading slashes from a raw link.
fn clean_link(link: &str) -> Option<String> {
    let link = link.split('|').next().unwrap_or(link);
    let link = link.split('#').next().unwrap_or(link);
    let link = link.trim().trim_start_matches('/').replace("%20", " ");
    if link.is_empty() { None } else { Some(link) }
}

/// Join a relative link onto a folder, resolving `.` and `..` segments.
///
/// Returns `None` when `..` would climb above the vault root.
fn join_relative(folder: &str, link: &str) -> Option<String> {
    let mut segments: Vec<&str> = folder.split('/').filter(|s| !s.is_empty()).collect();
    for segment in link.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }
    Some(segments.join("/"))
}

/// Resolve `link`, written in the note at `source_path`, to a vault file.
pub fn resolve_link(files: &[VaultFile], link: &str, source_path: &str) -> Option<VaultFile> {
    let link = clean_link(link)?;

    if let Some(file) = find_note(files, &link) {
        return Some(file.clone());
    }

    let folder = source_path.rsplit_once('/').map_or("", |(dir, _)| dir);
    if let Some(relative) = join_relative(folder, &link)
        && let Some(file) = find_note(files, &relative)
    {
        return Some(file.clone());
    }

    let suffix = format!("/{}", link);
    let note_suffix = format!("/{}.md", link);
    files
        .iter()
        .filter(|file| file.path.ends_with(&suffix) || file.path.ends_with(&note_suffix))
        .min_by(|a, b| {
            a.path
                .len()
                .cmp(&b.path.len())
                .then_with(|| a.path.cmp(&b.path))
        })
        .cloned()
}
