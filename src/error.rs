//! Error types for stack-config-edit

use crate::position::{LineIndex, Position};
use rowan::{TextRange, TextSize};
use std::fmt;

/// A parse error with its location in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionedParseError {
    /// The error message
    pub message: String,
    /// The text range where the error occurred
    pub range: TextRange,
    /// Line and column of the start of `range`
    pub position: Position,
}

impl fmt::Display for PositionedParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.message)
    }
}

impl std::error::Error for PositionedParseError {}

/// List of encountered syntax errors, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParseError(pub Vec<PositionedParseError>);

impl ParseError {
    /// All syntax errors found in the input.
    pub fn diagnostics(&self) -> &[PositionedParseError] {
        &self.0
    }

    /// The first syntax error, which is the one reported by `Display`.
    pub fn first(&self) -> Option<&PositionedParseError> {
        self.0.first()
    }

    /// Error for input that is not valid UTF-8.
    pub(crate) fn invalid_utf8(bytes: &[u8], err: std::str::Utf8Error) -> Self {
        let valid_up_to = err.valid_up_to();
        let prefix = std::str::from_utf8(&bytes[..valid_up_to]).unwrap_or_default();
        let position = LineIndex::new(prefix).position(valid_up_to);
        let start = TextSize::try_from(valid_up_to).unwrap_or_default();
        ParseError(vec![PositionedParseError {
            message: "invalid UTF-8 sequence".to_string(),
            range: TextRange::empty(start),
            position,
        }])
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "failed to parse YAML file")?;
        let mut errors = self.0.iter();
        if let Some(first) = errors.next() {
            write!(f, ": {}", first)?;
        }
        for err in errors {
            write!(f, "\n{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Errors that can occur when working with configuration documents
#[derive(Debug)]
pub enum YamlError {
    /// I/O error when reading or writing files
    Io(std::io::Error),
    /// The configuration text is not valid YAML
    Parse(ParseError),
    /// A path segment names a key the mapping does not contain
    KeyNotFound(String),
    /// A path segment, or the document root, is not a mapping
    TypeMismatch {
        /// The offending path segment, empty for the document root
        segment: String,
        /// What was found instead of a mapping
        found: &'static str,
    },
    /// A path segment uses syntax the navigator does not support
    UnsupportedPath {
        /// The offending path segment
        segment: String,
        /// Why the segment was rejected
        reason: &'static str,
    },
}

impl fmt::Display for YamlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YamlError::Io(err) => write!(f, "I/O error: {}", err),
            YamlError::Parse(err) => write!(f, "{}", err),
            YamlError::KeyNotFound(key) => write!(f, "config key not found: {:?}", key),
            YamlError::TypeMismatch { segment, found } if segment.is_empty() => {
                write!(f, "document root is a {}, not a mapping", found)
            }
            YamlError::TypeMismatch { segment, found } => {
                write!(f, "config key {:?} is a {}, not a mapping", segment, found)
            }
            YamlError::UnsupportedPath { segment, reason } => {
                write!(f, "unsupported config path segment {:?}: {}", segment, reason)
            }
        }
    }
}

impl std::error::Error for YamlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            YamlError::Io(err) => Some(err),
            YamlError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for YamlError {
    fn from(err: std::io::Error) -> Self {
        YamlError::Io(err)
    }
}

impl From<ParseError> for YamlError {
    fn from(err: ParseError) -> Self {
        YamlError::Parse(err)
    }
}

/// Result type for stack-config-edit operations
pub type YamlResult<T> = Result<T, YamlError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn error_at(line: usize, column: usize, message: &str) -> PositionedParseError {
        PositionedParseError {
            message: message.to_string(),
            range: TextRange::empty(TextSize::from(0)),
            position: Position { line, column },
        }
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError(vec![
            error_at(2, 3, "unexpected indentation"),
            error_at(4, 1, "expected a mapping key"),
        ]);
        assert_eq!(
            err.to_string(),
            "failed to parse YAML file: 2:3: unexpected indentation\n4:1: expected a mapping key"
        );
    }

    #[test]
    fn test_key_not_found_display() {
        let err = YamlError::KeyNotFound("config".to_string());
        assert_eq!(err.to_string(), "config key not found: \"config\"");
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = YamlError::TypeMismatch {
            segment: "config".to_string(),
            found: "scalar",
        };
        assert_eq!(
            err.to_string(),
            "config key \"config\" is a scalar, not a mapping"
        );
        let err = YamlError::TypeMismatch {
            segment: String::new(),
            found: "sequence",
        };
        assert_eq!(err.to_string(), "document root is a sequence, not a mapping");
    }

    #[test]
    fn test_invalid_utf8_position() {
        let bytes = b"a: 1\nb: \xff\n";
        let err = std::str::from_utf8(bytes).unwrap_err();
        let parse_error = ParseError::invalid_utf8(bytes, err);
        assert_eq!(
            parse_error.to_string(),
            "failed to parse YAML file: 2:4: invalid UTF-8 sequence"
        );
    }
}
