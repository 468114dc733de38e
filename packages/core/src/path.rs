//! Virtual path type with normalized, separator-free components.

use std::fmt;

use url::Url;

/// Errors related to path parsing and validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path component is empty or would escape the mount root.
    #[error("invalid path component '{component}' at position {position}: {message}")]
    InvalidComponent {
        component: String,
        position: usize,
        message: String,
    },
    /// The path string is invalid.
    #[error("invalid path: {message}")]
    InvalidPath { message: String },
}

/// A validated virtual path, relative to some mount root.
///
/// Components are separated by `/` and never contain the separator
/// themselves. `.` and `..` are rejected outright, so a `VirtualPath`
/// can never address anything above the root it is resolved against.
///
/// # Examples
///
/// ```rust
/// use mountfs_core::VirtualPath;
///
/// let path = VirtualPath::parse("lib/inner.tar/META").unwrap();
/// assert_eq!(path.len(), 3);
///
/// // Repeated and trailing slashes are normalized away
/// assert_eq!(VirtualPath::parse("a//b/").unwrap(), VirtualPath::parse("a/b").unwrap());
/// ```
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct VirtualPath {
    pub components: Vec<String>,
}

impl VirtualPath {
    /// The empty path (a mount root relative to itself).
    pub fn root() -> Self {
        VirtualPath {
            components: Vec::new(),
        }
    }

    /// Parse a path string, validating components.
    ///
    /// Empty components are ignored, which normalizes `//` and trailing `/`.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let components: Vec<String> = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();

        for (i, component) in components.iter().enumerate() {
            Self::validate_component(component, i)?;
        }

        Ok(VirtualPath { components })
    }

    /// Extract the path component of a URI as a `VirtualPath`.
    ///
    /// Scheme, host, query and fragment are ignored; only the path
    /// segments participate in resolution.
    pub fn from_uri(uri: &Url) -> Result<Self, PathError> {
        match uri.path_segments() {
            Some(segments) => {
                let components: Vec<String> = segments
                    .filter(|c| !c.is_empty())
                    .map(|c| c.to_string())
                    .collect();
                for (i, component) in components.iter().enumerate() {
                    Self::validate_component(component, i)?;
                }
                Ok(VirtualPath { components })
            }
            None => Err(PathError::InvalidPath {
                message: format!("uri '{}' has no path component", uri),
            }),
        }
    }

    fn validate_component(component: &str, position: usize) -> Result<(), PathError> {
        if component == "." || component == ".." {
            return Err(PathError::InvalidComponent {
                component: component.to_string(),
                position,
                message: "relative navigation is not allowed".to_string(),
            });
        }
        Ok(())
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True for the empty path.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The final component, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.components.last().map(|s| s.as_str())
    }

    /// Append another path to this one.
    pub fn join(&self, other: &VirtualPath) -> VirtualPath {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        VirtualPath { components }
    }

    /// Append a single validated component.
    pub fn child(&self, name: &str) -> Result<VirtualPath, PathError> {
        if name.is_empty() || name.contains('/') {
            return Err(PathError::InvalidComponent {
                component: name.to_string(),
                position: self.len(),
                message: "child name must be a single non-empty component".to_string(),
            });
        }
        Self::validate_component(name, self.len())?;
        let mut components = self.components.clone();
        components.push(name.to_string());
        Ok(VirtualPath { components })
    }

    /// Check if this path starts with the given prefix.
    pub fn has_prefix(&self, prefix: &VirtualPath) -> bool {
        prefix.components.len() <= self.components.len()
            && prefix.components == self.components[..prefix.components.len()]
    }

    /// Strip a prefix from this path.
    pub fn strip_prefix(&self, prefix: &VirtualPath) -> Option<VirtualPath> {
        if self.has_prefix(prefix) {
            Some(VirtualPath {
                components: self.components[prefix.components.len()..].to_vec(),
            })
        } else {
            None
        }
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("/"))
    }
}

/// Construct a `VirtualPath` from a literal, panicking on invalid input.
#[macro_export]
macro_rules! vpath {
    ($s:expr) => {
        $crate::VirtualPath::parse($s).expect("invalid path literal")
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_paths() {
        assert_eq!(VirtualPath::parse("").unwrap().len(), 0);
        assert_eq!(VirtualPath::parse("foo").unwrap().len(), 1);
        assert_eq!(VirtualPath::parse("foo/bar").unwrap().len(), 2);
    }

    #[test]
    fn normalize_slashes() {
        assert_eq!(vpath!("a//b"), vpath!("a/b"));
        assert_eq!(vpath!("a/b/"), vpath!("a/b"));
        assert_eq!(vpath!("/a/b"), vpath!("a/b"));
    }

    #[test]
    fn rejects_relative_navigation() {
        assert!(VirtualPath::parse("a/../b").is_err());
        assert!(VirtualPath::parse("./a").is_err());
        assert!(vpath!("a").child("..").is_err());
        assert!(vpath!("a").child("b/c").is_err());
    }

    #[test]
    fn join_and_child() {
        assert_eq!(vpath!("a").join(&vpath!("b/c")), vpath!("a/b/c"));
        assert_eq!(vpath!("a").child("b").unwrap(), vpath!("a/b"));
        assert_eq!(VirtualPath::root().child("a").unwrap(), vpath!("a"));
    }

    #[test]
    fn strip_prefix_works() {
        let p = vpath!("foo/bar/baz");
        assert_eq!(p.strip_prefix(&vpath!("foo")), Some(vpath!("bar/baz")));
        assert_eq!(p.strip_prefix(&vpath!("foo/bar")), Some(vpath!("baz")));
        assert_eq!(p.strip_prefix(&VirtualPath::root()), Some(p.clone()));
        assert_eq!(p.strip_prefix(&vpath!("other")), None);
    }

    #[test]
    fn prefix_matches_whole_components_only() {
        assert!(!vpath!("ab/c").has_prefix(&vpath!("a")));
        assert!(vpath!("a/b").has_prefix(&vpath!("a")));
    }

    #[test]
    fn from_uri_takes_path_only() {
        let uri = Url::parse("file:///deploy/app.war?version=2#frag").unwrap();
        assert_eq!(VirtualPath::from_uri(&uri).unwrap(), vpath!("deploy/app.war"));
    }

    #[test]
    fn display_round_trip() {
        let p = vpath!("a/b/c");
        assert_eq!(p.to_string(), "a/b/c");
        assert_eq!(VirtualPath::parse(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn file_name() {
        assert_eq!(vpath!("a/b").file_name(), Some("b"));
        assert_eq!(VirtualPath::root().file_name(), None);
    }
}
