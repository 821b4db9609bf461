//! Configuration values and the two shapes they take in YAML.

use crate::yaml::{Mapping, Scalar, SyntaxNode};
use rowan::ast::AstNode;
use std::fmt;

/// A configuration value, holding either plain text or a ciphertext.
///
/// A plain value is written as a scalar:
///
/// ```yaml
/// region: us-west-2
/// ```
///
/// A secure value is written as a one-entry mapping keyed by `secure`:
///
/// ```yaml
/// password:
///   secure: AAABADlkY=
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigValue {
    /// Stored as a scalar
    Plain(String),
    /// Stored under a nested `secure` key
    Secure(String),
}

impl ConfigValue {
    /// The key marking a secure value.
    pub const SECURE_KEY: &'static str = "secure";

    /// Create a plain value
    pub fn plain(text: impl Into<String>) -> Self {
        ConfigValue::Plain(text.into())
    }

    /// Create a secure value
    pub fn secure(cipher_text: impl Into<String>) -> Self {
        ConfigValue::Secure(cipher_text.into())
    }

    /// Whether the value is stored under a `secure` key.
    pub fn is_secure(&self) -> bool {
        matches!(self, ConfigValue::Secure(_))
    }

    /// The stored text, encrypted or not.
    pub fn cipher_text(&self) -> &str {
        match self {
            ConfigValue::Plain(text) | ConfigValue::Secure(text) => text,
        }
    }

    /// Read a value back from a value node.
    ///
    /// Returns `None` for nodes that are neither a scalar nor a mapping
    /// holding exactly one `secure` entry with a scalar value.
    pub(crate) fn from_value_node(node: &SyntaxNode) -> Option<Self> {
        if let Some(scalar) = Scalar::cast(node.clone()) {
            return Some(ConfigValue::Plain(scalar.as_string()));
        }
        let mapping = Mapping::cast(node.clone())?;
        let mut entries = mapping.entries();
        let entry = entries.next()?;
        if entries.next().is_some() || entry.key_text().as_deref() != Some(Self::SECURE_KEY) {
            return None;
        }
        let scalar = Scalar::cast(entry.value()?)?;
        Some(ConfigValue::Secure(scalar.as_string()))
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Plain(text) => write!(f, "{}", text),
            ConfigValue::Secure(text) => write!(f, "{}: {}", Self::SECURE_KEY, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::Yaml;
    use std::str::FromStr;

    fn value_of(text: &str) -> Option<ConfigValue> {
        let yaml = Yaml::from_str(text).expect("valid yaml");
        let mapping = yaml.document().and_then(|d| d.as_mapping()).expect("mapping");
        let entry = mapping.entries().next().expect("entry");
        ConfigValue::from_value_node(&entry.value()?)
    }

    #[test]
    fn test_plain_value() {
        assert_eq!(value_of("a: hello\n"), Some(ConfigValue::plain("hello")));
        assert_eq!(value_of("a: 'it''s'\n"), Some(ConfigValue::plain("it's")));
    }

    #[test]
    fn test_secure_value_block() {
        assert_eq!(
            value_of("a:\n  secure: AAAB==\n"),
            Some(ConfigValue::secure("AAAB=="))
        );
    }

    #[test]
    fn test_secure_value_flow() {
        assert_eq!(
            value_of("a: {secure: XYZ}\n"),
            Some(ConfigValue::secure("XYZ"))
        );
    }

    #[test]
    fn test_other_shapes() {
        assert_eq!(value_of("a:\n  secure: x\n  other: y\n"), None);
        assert_eq!(value_of("a:\n  insecure: x\n"), None);
        assert_eq!(value_of("a: [1, 2]\n"), None);
        assert_eq!(value_of("a:\n"), None);
    }

    #[test]
    fn test_accessors() {
        let value = ConfigValue::secure("XYZ");
        assert!(value.is_secure());
        assert_eq!(value.cipher_text(), "XYZ");
        assert_eq!(value.to_string(), "secure: XYZ");
        let value = ConfigValue::plain("us-west-2");
        assert!(!value.is_secure());
        assert_eq!(value.to_string(), "us-west-2");
    }
}
