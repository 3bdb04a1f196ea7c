//! Path scoping and exclusion policy
//!
//! Vault paths are published relative to an optional root directory. A path
//! is skipped when it lies outside that root, when it matches one of the
//! exclusion patterns, or when the file opts out via its front matter.
//!
//! The free functions compile patterns on every call. [`PathPolicy`] holds a
//! precompiled [`ExclusionSet`] and gives identical answers.

use regex::Regex;

/// Trim leading and trailing slashes from a root directory setting.
fn trim_root(root_dir: &str) -> &str {
    root_dir.trim_matches('/')
}

/// Strip the root directory prefix from a vault path.
///
/// Leading slashes are always removed. A path equal to the root becomes the
/// empty string. Paths outside the root are returned unchanged apart from the
/// slash trimming; callers must check [`is_within_root`] before relying on
/// the result.
pub fn normalize(path: &str, root_dir: &str) -> String {
    let path = path.trim_start_matches('/');
    let root = trim_root(root_dir);

    if root.is_empty() {
        return path.to_string();
    }
    if path == root {
        return String::new();
    }
    match path.strip_prefix(root).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) => rest.trim_start_matches('/').to_string(),
        None => path.to_string(),
    }
}

/// Check whether a vault path lies inside the root directory.
///
/// Matches whole segments only: a root of `blog` contains `blog/post.md` but
/// not `blog-archive/post.md`.
pub fn is_within_root(path: &str, root_dir: &str) -> bool {
    let root = trim_root(root_dir);
    if root.is_empty() {
        return true;
    }
    let path = path.trim_matches('/');
    path == root
        || path
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Check a path against exclusion patterns, compiling them on the fly.
///
/// Patterns that fail to compile are logged and treated as non-matching.
pub fn is_excluded<S: AsRef<str>>(path: &str, patterns: &[S]) -> bool {
    patterns.iter().any(|pattern| {
        let pattern = pattern.as_ref();
        match Regex::new(pattern) {
            Ok(regex) => regex.is_match(path),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Ignoring invalid exclusion pattern");
                false
            }
        }
    })
}

/// Decide whether a file is left out of publishing.
pub fn should_skip<S: AsRef<str>>(
    path: &str,
    publish_disabled: bool,
    root_dir: &str,
    patterns: &[S],
) -> bool {
    !is_within_root(path, root_dir) || is_excluded(path, patterns) || publish_disabled
}

/// A precompiled, ordered list of exclusion patterns.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    compiled: Vec<Regex>,
    invalid: Vec<InvalidPattern>,
}

/// A pattern that failed to compile, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPattern {
    pub pattern: String,
    pub message: String,
}

impl ExclusionSet {
    /// Compile the given patterns, skipping (and logging) invalid ones.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Self {
        let mut set = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Regex::new(pattern) {
                Ok(regex) => set.compiled.push(regex),
                Err(e) => {
                    tracing::warn!(pattern, error = %e, "Ignoring invalid exclusion pattern");
                    set.invalid.push(InvalidPattern {
                        pattern: pattern.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }
        set
    }

    /// Check whether any valid pattern matches the path.
    pub fn is_match(&self, path: &str) -> bool {
        self.compiled.iter().any(|regex| regex.is_match(path))
    }

    /// Patterns that were rejected at compile time.
    pub fn invalid(&self) -> &[InvalidPattern] {
        &self.invalid
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Root scope plus exclusion patterns, compiled once per settings load.
#[derive(Debug, Clone, Default)]
pub struct PathPolicy {
    root_dir: String,
    exclusions: ExclusionSet,
}

impl PathPolicy {
    pub fn new<S: AsRef<str>>(root_dir: &str, patterns: &[S]) -> Self {
        Self {
            root_dir: trim_root(root_dir).to_string(),
            exclusions: ExclusionSet::compile(patterns),
        }
    }

    /// The root directory with surrounding slashes removed.
    pub fn root_dir(&self) -> &str {
        &self.root_dir
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn normalize(&self, path: &str) -> String {
        normalize(path, &self.root_dir)
    }

    /// Map a site path back to the vault path it was published from.
    ///
    /// Inverse of [`normalize`] for paths inside the root.
    pub fn to_vault_path(&self, site_path: &str) -> String {
        let site_path = site_path.trim_start_matches('/');
        if self.root_dir.is_empty() {
            site_path.to_string()
        } else {
            format!("{}/{}", self.root_dir, site_path)
        }
    }

    pub fn is_within_root(&self, path: &str) -> bool {
        is_within_root(path, &self.root_dir)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclusions.is_match(path)
    }

    pub fn should_skip(&self, path: &str, publish_disabled: bool) -> bool {
        !self.is_within_root(path) || self.is_excluded(path) || publish_disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_leading_slashes() {
        assert_eq!(normalize("//notes/a.md", ""), "notes/a.md");
    }

    #[test]
    fn normalize_removes_root_prefix() {
        assert_eq!(normalize("blog/old.md", "blog"), "old.md");
        assert_eq!(normalize("/blog/sub/x.md", "/blog/"), "sub/x.md");
    }

    #[test]
    fn to_vault_path_restores_root_prefix() {
        let policy = PathPolicy::new("/blog/", &[] as &[&str]);
        assert_eq!(policy.to_vault_path("blog/x.md"), "blog/blog/x.md");
        assert_eq!(policy.normalize(&policy.to_vault_path("blog/x.md")), "blog/x.md");
        assert_eq!(PathPolicy::default().to_vault_path("/x.md"), "x.md");
    }

    #[test]
    fn normalize_root_itself_is_empty() {
        assert_eq!(normalize("blog", "blog"), "");
    }

    #[test]
    fn normalize_passes_through_outside_root() {
        assert_eq!(normalize("blog-archive/x.md", "blog"), "blog-archive/x.md");
        assert_eq!(normalize("other/x.md", "blog"), "other/x.md");
    }

    #[test]
    fn invalid_pattern_is_recorded_not_fatal() {
        let set = ExclusionSet::compile(&["(unclosed", r"\.tmp$"]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.invalid().len(), 1);
        assert_eq!(set.invalid()[0].pattern, "(unclosed");
        assert!(set.is_match("scratch.tmp"));
    }

    #[test]
    fn policy_trims_root_setting() {
        let policy = PathPolicy::new("/blog/", &[] as &[&str]);
        assert_eq!(policy.root_dir(), "blog");
        assert!(policy.is_within_root("blog/a.md"));
    }
}
