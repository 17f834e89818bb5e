use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized, `/`-separated path inside a storage backend.
///
/// Paths are always absolute within their backend: `VfsPath::new("a/b")` and
/// `VfsPath::new("/a/./b/")` are the same path, `/a/b`. Empty and `.`
/// components are dropped and `..` removes the previous component (it never
/// climbs above the root).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct VfsPath {
    components: Vec<String>,
}

impl VfsPath {
    /// Parse and normalize a path string.
    pub fn new(path: &str) -> Self {
        let mut components: Vec<String> = Vec::new();
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                other => components.push(other.to_string()),
            }
        }
        Self { components }
    }

    /// The backend root, `/`.
    pub fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Append one or more `/`-separated components.
    pub fn join(&self, relative: &str) -> Self {
        let mut joined = self.to_string();
        joined.push('/');
        joined.push_str(relative);
        Self::new(&joined)
    }

    /// The last component, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// The containing directory, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.components.is_empty() {
            return None;
        }
        Some(Self {
            components: self.components[..self.components.len() - 1].to_vec(),
        })
    }

    /// Iterate over the path components from the root down.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(String::as_str)
    }

    /// Returns `true` if `self` is the direct parent directory of `other`.
    pub fn is_parent_of(&self, other: &Self) -> bool {
        other.components.len() == self.components.len() + 1
            && other.components.starts_with(&self.components)
    }

    /// Returns `true` if `self` equals `other` or lies beneath it.
    pub fn starts_with(&self, other: &Self) -> bool {
        self.components.starts_with(&other.components)
    }
}

impl Default for VfsPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return f.write_str("/");
        }
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VfsPath({self})")
    }
}

impl From<&str> for VfsPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for VfsPath {
    fn from(path: String) -> Self {
        Self::new(&path)
    }
}

impl From<VfsPath> for String {
    fn from(path: VfsPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalizes_separators_and_dots() {
        assert_eq!(VfsPath::new("a/b").to_string(), "/a/b");
        assert_eq!(VfsPath::new("/a/./b/").to_string(), "/a/b");
        assert_eq!(VfsPath::new("//a//b").to_string(), "/a/b");
    }

    #[test]
    fn parent_dir_never_climbs_above_root() {
        assert_eq!(VfsPath::new("/a/../..").to_string(), "/");
        assert_eq!(VfsPath::new("/a/b/../c").to_string(), "/a/c");
    }

    #[test]
    fn root_display() {
        assert_eq!(VfsPath::root().to_string(), "/");
        assert!(VfsPath::new("").is_root());
    }

    #[test]
    fn join_appends() {
        let base = VfsPath::new("/widgets");
        assert_eq!(base.join("a").to_string(), "/widgets/a");
        assert_eq!(base.join("x/y").to_string(), "/widgets/x/y");
    }

    #[test]
    fn file_name_and_parent() {
        let p = VfsPath::new("/widgets/a");
        assert_eq!(p.file_name(), Some("a"));
        assert_eq!(p.parent(), Some(VfsPath::new("/widgets")));
        assert_eq!(VfsPath::root().parent(), None);
        assert_eq!(VfsPath::root().file_name(), None);
    }

    #[test]
    fn direct_parent_relation() {
        let dir = VfsPath::new("/widgets");
        assert!(dir.is_parent_of(&VfsPath::new("/widgets/a")));
        assert!(!dir.is_parent_of(&VfsPath::new("/widgets/a/b")));
        assert!(!dir.is_parent_of(&VfsPath::new("/widgetsx")));
        assert!(VfsPath::root().is_parent_of(&VfsPath::new("/top")));
    }

    #[test]
    fn starts_with_is_component_wise() {
        assert!(VfsPath::new("/widgets/a").starts_with(&VfsPath::new("/widgets")));
        assert!(!VfsPath::new("/widgetsx/a").starts_with(&VfsPath::new("/widgets")));
    }

    #[test]
    fn string_conversions_roundtrip() {
        let p = VfsPath::from("widgets/a");
        let s = String::from(p.clone());
        assert_eq!(s, "/widgets/a");
        assert_eq!(VfsPath::from(s), p);
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(s in "[a-z./]{0,24}") {
            let once = VfsPath::new(&s);
            let twice = VfsPath::new(&once.to_string());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn join_of_plain_name_has_that_file_name(name in "[a-z0-9-]{1,16}") {
            let p = VfsPath::new("/base").join(&name);
            prop_assert_eq!(p.file_name(), Some(name.as_str()));
            prop_assert!(VfsPath::new("/base").is_parent_of(&p));
        }
    }
}
