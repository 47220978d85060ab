//! Dotted key paths and their parsing.

use alloc::borrow::Cow;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::{error, fmt};

/// Delimiter between key path segments.
pub const KEY_PATH_DELIMITER: char = '.';

// -----------------------------------------------------------------------------
// Error

/// An error describing where a key path string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParseError {
    /// Position in `path` at which the offending segment starts.
    pub offset: usize,
    /// The path that the error occurred in.
    pub path: String,
    /// The underlying error.
    pub error: Cow<'static, str>,
}

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "encountered an error at offset {} while parsing `{}`: {}",
            self.offset, self.path, self.error,
        )
    }
}

impl error::Error for PathParseError {}

// -----------------------------------------------------------------------------
// KeyPath

/// A parsed key path: one or more non-empty segments split on
/// [`KEY_PATH_DELIMITER`].
///
/// A single plain key parses to a path of length one; parsing never
/// produces an empty path.
///
/// # Examples
///
/// ```
/// use kv_access::KeyPath;
///
/// let path = KeyPath::parse("owner.name").unwrap();
/// assert_eq!(path.segments(), ["owner", "name"]);
/// assert_eq!(path.intermediates(), ["owner"]);
/// assert_eq!(path.terminal(), "name");
///
/// assert!(KeyPath::parse("").is_err());
/// assert!(KeyPath::parse("owner..name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath<'a> {
    segments: Vec<&'a str>,
}

impl<'a> KeyPath<'a> {
    /// Splits `path` on [`KEY_PATH_DELIMITER`], rejecting an empty path or
    /// any empty segment.
    pub fn parse(path: &'a str) -> Result<Self, PathParseError> {
        if path.is_empty() {
            return Err(PathParseError {
                offset: 0,
                path: String::new(),
                error: "empty key path".into(),
            });
        }

        let mut segments = Vec::new();
        let mut offset = 0;
        for segment in path.split(KEY_PATH_DELIMITER) {
            if segment.is_empty() {
                return Err(PathParseError {
                    offset,
                    path: path.to_string(),
                    error: "empty key path segment".into(),
                });
            }
            segments.push(segment);
            offset += segment.len() + KEY_PATH_DELIMITER.len_utf8();
        }

        Ok(Self { segments })
    }

    /// All segments in order.
    #[inline]
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// Number of segments, always at least one.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The final segment, naming the terminal attribute.
    #[inline]
    pub fn terminal(&self) -> &'a str {
        self.segments[self.segments.len() - 1]
    }

    /// Every segment before the terminal one, in traversal order.
    #[inline]
    pub fn intermediates(&self) -> &[&'a str] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl fmt::Display for KeyPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}
