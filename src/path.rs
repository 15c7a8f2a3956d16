//! Paths that errors are reported under.
//!
//! A [`FieldPath`] is what a rule was registered for (`Email`), extended by
//! nested validation with item indexes and nested members
//! (`Children[2].Name`). Registration goes through [`FieldPath::property`],
//! which rejects names that are not plain members.

use std::fmt::{self, Display};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ConfigError;

const PROPERTY_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Member(String),
    Item(usize),
}

/// Location of a failing value inside the validated instance.
///
/// The root path has no segments. It stands for the instance itself and
/// renders as an empty string.
///
/// # Example
///
/// ```rust
/// use inquest::FieldPath;
///
/// let children = FieldPath::property("Children").unwrap();
/// let name = FieldPath::property("Name").unwrap();
///
/// let path = children.push_index(2).join(&name);
/// assert_eq!(path.to_string(), "Children[2].Name");
/// assert_eq!(path.head(), Some("Children"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The path of the instance itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// A single-member path, without checking the name.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Member(name.into())],
        }
    }

    /// Parses the property name given to a rule registration.
    ///
    /// An empty name targets the whole instance and yields the root path. Any
    /// other name must be a plain member identifier; computed expressions such
    /// as `"a.b"` or `"len()"` are rejected.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPropertyPath` if the name is not empty and
    /// not an identifier.
    ///
    /// # Example
    ///
    /// ```rust
    /// use inquest::FieldPath;
    ///
    /// assert_eq!(FieldPath::property("Email").unwrap().to_string(), "Email");
    /// assert!(FieldPath::property("").unwrap().is_root());
    /// assert!(FieldPath::property("name.len()").is_err());
    /// ```
    pub fn property(name: &str) -> Result<Self, ConfigError> {
        match name {
            "" => Ok(Self::root()),
            _ if property_name_regex().is_match(name) => Ok(Self::from_field(name)),
            _ => Err(ConfigError::InvalidPropertyPath(name.to_string())),
        }
    }

    /// Returns this path with an item index appended, e.g. `Children[3]`.
    pub fn push_index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Item(index));
        path
    }

    /// Returns this path followed by all segments of `other`.
    ///
    /// Joining with a root path on either side returns the other path unchanged.
    pub fn join(&self, other: &FieldPath) -> Self {
        let mut path = self.clone();
        path.segments.extend_from_slice(&other.segments);
        path
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The leading member name: `Children` for `Children[2].Name`.
    pub fn head(&self) -> Option<&str> {
        match self.segments.first() {
            Some(Segment::Member(name)) => Some(name.as_str()),
            _ => None,
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            match segment {
                Segment::Member(name) if first => f.write_str(name)?,
                Segment::Member(name) => write!(f, ".{}", name)?,
                Segment::Item(index) => write!(f, "[{}]", index)?,
            }
            first = false;
        }
        Ok(())
    }
}

fn property_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(PROPERTY_NAME_PATTERN).expect("property name pattern is a valid regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_renders_empty() {
        let path = FieldPath::root();
        assert!(path.is_root());
        assert_eq!(path.head(), None);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_item_index_follows_member() {
        let path = FieldPath::from_field("Children").push_index(2);
        assert_eq!(path.to_string(), "Children[2]");
        assert_eq!(path.head(), Some("Children"));
    }

    #[test]
    fn test_join_prefixes_nested_path() {
        let prefix = FieldPath::from_field("Children").push_index(1);
        let nested = FieldPath::from_field("Name");
        assert_eq!(prefix.join(&nested).to_string(), "Children[1].Name");
    }

    #[test]
    fn test_join_with_root_is_identity() {
        let path = FieldPath::from_field("Wife");
        assert_eq!(FieldPath::root().join(&path), path);
        assert_eq!(path.join(&FieldPath::root()), path);
    }

    #[test]
    fn test_index_at_root_has_no_head() {
        let path = FieldPath::root().push_index(0);
        assert_eq!(path.to_string(), "[0]");
        assert_eq!(path.head(), None);
    }

    #[test]
    fn test_property_accepts_identifiers() {
        for name in ["Name", "date_of_birth", "_hidden", "Field2"] {
            let path = FieldPath::property(name).unwrap();
            assert_eq!(path.to_string(), name);
            assert_eq!(path.head(), Some(name));
        }
    }

    #[test]
    fn test_property_rejects_computed_expressions() {
        for name in ["a.b", "len()", "2nd", "items[0]", " Name", "x + y"] {
            let err = FieldPath::property(name).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidPropertyPath(ref n) if n == name));
        }
    }
}
