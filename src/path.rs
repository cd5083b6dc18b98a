//! Data paths for locating values in nested structures.
//!
//! A [`Path`] records the exact chain of key and index accesses from the
//! root of a parse call down to the value currently being validated. Every
//! [`Issue`](crate::Issue) carries the path of the context that recorded it.

use std::fmt::{self, Display};

/// A single step in a data path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field access (e.g. `user`, `email`).
    Key(String),
    /// A positional access into an array, tuple, set or map (e.g. `[0]`).
    Index(usize),
}

impl PathSegment {
    /// Creates a key segment.
    pub fn key(name: impl Into<String>) -> Self {
        PathSegment::Key(name.into())
    }

    /// Creates an index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(name) => write!(f, "{}", name),
            PathSegment::Index(idx) => write!(f, "{}", idx),
        }
    }
}

/// The access chain from a parse root to a nested value.
///
/// Paths are immutable; the push methods return extended copies, so a parent
/// context can hand the same base path to many children.
///
/// # Example
///
/// ```rust
/// use scrutiny::Path;
///
/// let path = Path::root().push_key("users").push_index(0).push_key("email");
/// assert_eq!(path.to_string(), "users[0].email");
/// assert_eq!(path.dotted(), "users.0.email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    /// The empty path, addressing the root value itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `segment` appended.
    pub fn push(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    /// Returns a new path with a key segment appended.
    pub fn push_key(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Key(name.into()))
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        self.push(PathSegment::Index(index))
    }

    /// True if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterates over the segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// All segments except the last, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// The last segment, or `None` at the root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Renders every segment joined with dots: `users.0.email`.
    ///
    /// This is the rendering used inside the brackets of
    /// [`ParseError::format`](crate::ParseError::format).
    pub fn dotted(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&segment.to_string());
        }
        out
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_is_empty() {
        let path = Path::root();
        assert!(path.is_root());
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "");
        assert_eq!(path.dotted(), "");
    }

    #[test]
    fn single_key() {
        let path = Path::root().push_key("user");
        assert_eq!(path.to_string(), "user");
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn index_rendering() {
        let path = Path::root().push_index(0);
        assert_eq!(path.to_string(), "[0]");
        assert_eq!(path.dotted(), "0");
    }

    #[test]
    fn mixed_rendering() {
        let path = Path::root()
            .push_key("users")
            .push_index(2)
            .push_key("email");
        assert_eq!(path.to_string(), "users[2].email");
        assert_eq!(path.dotted(), "users.2.email");
    }

    #[test]
    fn push_does_not_mutate() {
        let base = Path::root().push_key("users");
        let a = base.push_index(0);
        let b = base.push_index(1);

        assert_eq!(base.to_string(), "users");
        assert_eq!(a.to_string(), "users[0]");
        assert_eq!(b.to_string(), "users[1]");
    }

    #[test]
    fn parent_chain() {
        let path = Path::root()
            .push_key("users")
            .push_index(0)
            .push_key("email");

        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "users[0]");

        let grandparent = parent.parent().unwrap();
        assert_eq!(grandparent.to_string(), "users");

        let root = grandparent.parent().unwrap();
        assert!(root.is_root());
        assert!(root.parent().is_none());
    }

    #[test]
    fn last_segment() {
        let path = Path::root().push_key("users").push_index(0);
        assert_eq!(path.last(), Some(&PathSegment::Index(0)));
        assert_eq!(Path::root().last(), None);
    }

    #[test]
    fn equality() {
        let a = Path::root().push_key("a").push_index(0);
        let b = Path::root().push_key("a").push_index(0);
        let c = Path::root().push_key("a").push_index(1);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
