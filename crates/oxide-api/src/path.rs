//! Path pattern compilation and request path splitting.

use std::fmt;

use crate::error::{Result, RouterError};

/// A segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A literal segment, matched exactly.
    Literal(String),
    /// A named segment (`:id`), matches a single path part.
    Named(String),
    /// A tail segment (`::path`), matches the remainder of the path.
    Tail(String),
}

impl Segment {
    fn parse(part: &str) -> Self {
        if let Some(name) = part.strip_prefix("::") {
            Self::Tail(name.to_string())
        } else if let Some(name) = part.strip_prefix(':') {
            Self::Named(name.to_string())
        } else {
            Self::Literal(part.to_string())
        }
    }

    /// Ranks how specific a segment is; literals rank highest.
    pub(crate) const fn rank(&self) -> u8 {
        match self {
            Self::Literal(_) => 2,
            Self::Named(_) => 1,
            Self::Tail(_) => 0,
        }
    }
}

/// A compiled path pattern.
///
/// Pattern syntax:
/// - `/users` - Literal path
/// - `/users/:id` - Path with a named parameter
/// - `/files/::path` - Tail parameter (matches the rest of the path)
///
/// The root path `/` compiles to a pattern without segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Pattern {
    segments: Vec<Segment>,
}

impl Pattern {
    /// Compiles a path pattern string.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_api::{Pattern, Segment};
    ///
    /// let pattern = Pattern::compile("/posts/:id/::rest").unwrap();
    /// assert_eq!(pattern.segments()[1], Segment::Named("id".to_string()));
    /// assert!(Pattern::compile("/files/::path/:id").is_err());
    /// ```
    pub fn compile(path: &str) -> Result<Self> {
        if path.is_empty() || path == "/" {
            return Ok(Self::default());
        }
        let Some(rest) = path.strip_prefix('/') else {
            return Err(RouterError::malformed(path, "must start with a slash"));
        };
        if rest.ends_with('/') {
            return Err(RouterError::malformed(path, "must not end with a slash"));
        }

        let segments = rest.split('/').map(Segment::parse).collect();
        let pattern = Self { segments };
        pattern.check_tail(path)?;
        Ok(pattern)
    }

    /// Concatenates a group prefix and a local pattern.
    ///
    /// An empty local pattern yields the prefix itself.
    pub fn join(prefix: &Self, local: &Self) -> Result<Self> {
        let mut segments = prefix.segments.clone();
        segments.extend(local.segments.iter().cloned());
        let pattern = Self { segments };
        pattern.check_tail(&format!("{prefix}{local}"))?;
        Ok(pattern)
    }

    fn check_tail(&self, source: &str) -> Result<()> {
        let last = self.segments.len().saturating_sub(1);
        let misplaced = self
            .segments
            .iter()
            .enumerate()
            .any(|(i, s)| matches!(s, Segment::Tail(_)) && i != last);
        if misplaced {
            return Err(RouterError::malformed(
                source,
                "a tail segment must be the last segment",
            ));
        }
        Ok(())
    }

    /// Returns the compiled segments.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns true for the root pattern.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true when the pattern ends in a tail segment.
    pub fn has_tail(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Tail(_)))
    }

    /// Renders the pattern with its parameter markers, e.g. `/users/:id`.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Renders the pattern with parameter names erased, e.g. `/users/:`.
    ///
    /// Two patterns with the same shape match exactly the same paths.
    pub fn shape(&self) -> String {
        if self.segments.is_empty() {
            return "/".to_string();
        }
        let mut shape = String::new();
        for segment in &self.segments {
            shape.push('/');
            match segment {
                Segment::Literal(text) => shape.push_str(text),
                Segment::Named(_) => shape.push(':'),
                Segment::Tail(_) => shape.push_str("::"),
            }
        }
        shape
    }

    /// Tests whether the split request path matches this pattern.
    ///
    /// The root path must be passed as no parts at all, not as `[""]`.
    pub fn matches(&self, parts: &[&str]) -> bool {
        let fixed = if self.has_tail() {
            self.segments.len() - 1
        } else {
            self.segments.len()
        };

        let length_ok = if self.has_tail() {
            parts.len() >= fixed
        } else {
            parts.len() == fixed
        };
        if !length_ok {
            return false;
        }

        self.segments[..fixed]
            .iter()
            .zip(parts)
            .all(|(segment, part)| match segment {
                Segment::Literal(text) => text == part,
                Segment::Named(_) | Segment::Tail(_) => true,
            })
    }

    /// Compares how specific two patterns are, segment by segment.
    ///
    /// Literals beat named segments and named segments beat tails. A
    /// pattern that still has segments beats one that ran out, unless
    /// the only segment left is a tail matching nothing.
    pub(crate) fn specificity_cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        let mut left = self.segments.iter();
        let mut right = other.segments.iter();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                (Some(Segment::Tail(_)), None) => return Ordering::Less,
                (None, Some(Segment::Tail(_))) => return Ordering::Greater,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some(a), Some(b)) => {
                    let ord = a.rank().cmp(&b.rank());
                    if ord.is_ne() {
                        return ord;
                    }
                }
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => write!(f, "/{text}")?,
                Segment::Named(name) => write!(f, "/:{name}")?,
                Segment::Tail(name) => write!(f, "/::{name}")?,
            }
        }
        Ok(())
    }
}

/// Splits a request path into its parts.
///
/// The root path yields a single empty part. A trailing slash is an error.
///
/// ```
/// use oxide_api::split_parts;
///
/// assert_eq!(split_parts("/path/to/file.ext").unwrap(), ["path", "to", "file.ext"]);
/// assert_eq!(split_parts("/").unwrap(), [""]);
/// assert!(split_parts("/path/to/dir/").is_err());
/// ```
pub fn split_parts(path: &str) -> Result<Vec<&str>> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    if rest.is_empty() {
        return Ok(vec![""]);
    }
    if rest.ends_with('/') {
        return Err(RouterError::malformed(path, "must not end with a slash"));
    }
    Ok(rest.split('/').collect())
}

/// Splits a request path, silently dropping one trailing slash.
pub fn split_parts_lenient(path: &str) -> Vec<&str> {
    let rest = path.strip_prefix('/').unwrap_or(path);
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() {
        return vec![""];
    }
    rest.split('/').collect()
}

/// Normalizes split parts for matching: the root path has no parts.
pub(crate) fn request_parts<'a, 'p>(parts: &'a [&'p str]) -> &'a [&'p str] {
    match parts {
        [""] => &[],
        _ => parts,
    }
}
