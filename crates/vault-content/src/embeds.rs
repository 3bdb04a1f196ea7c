//! Embedded resource extraction
//!
//! Recognizes wiki embeds (`![[target#heading|alias]]`) and markdown image
//! embeds (`![alt](path "title")`). Targets are returned in document order,
//! deduplicated, with heading/block anchors and aliases removed. External
//! URLs and anything inside fenced code blocks are ignored.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"!\[\[(?P<wiki>[^\[\]\n]+?)\]\]|!\[[^\]\n]*\]\((?P<md>[^)\n]+)\)").unwrap()
});

/// Check whether a link points outside the vault.
pub fn is_external_link(link: &str) -> bool {
    let lower = link.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("data:") || lower.starts_with("mailto:")
}

fn clean_wiki_target(raw: &str) -> Option<String> {
    let target = raw.split('|').next().unwrap_or(raw);
    finish_target(target)
}

fn clean_markdown_target(raw: &str) -> Option<String> {
    let raw = raw.trim();
    // `<path with spaces>` or `path "optional title"`
    let target = match raw.strip_prefix('<') {
        Some(rest) => rest.split('>').next().unwrap_or(rest),
        None => raw.split_whitespace().next().unwrap_or(raw),
    };
    finish_target(&target.replace("%20", " "))
}

fn finish_target(target: &str) -> Option<String> {
    let target = target.split('#').next().unwrap_or(target).trim();
    if target.is_empty() || is_external_link(target) {
        return None;
    }
    Some(target.to_string())
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Extract embedded resource targets from a markdown body.
pub fn extract_embeds(markdown: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    let mut in_fence = false;

    for line in markdown.lines() {
        if is_fence(line) {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        for caps in EMBED.captures_iter(line) {
            let target = if let Some(wiki) = caps.name("wiki") {
                clean_wiki_target(wiki.as_str())
            } else {
                caps.name("md")
                    .and_then(|md| clean_markdown_target(md.as_str()))
            };

            if let Some(target) = target
                && seen.insert(target.clone())
            {
                targets.push(target);
            }
        }
    }

    targets
}
