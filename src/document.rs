//! A stack configuration document that can be edited without losing formatting.

use crate::error::{ParseError, YamlError, YamlResult};
use crate::path::resolve;
use crate::value::ConfigValue;
use crate::yaml::{node_shape, Mapping, Yaml};
use rowan::ast::AstNode;
use std::str::FromStr;
use tracing::debug;

/// A parsed configuration file.
///
/// Edits are made in place on the syntax tree, so serializing after an edit
/// reproduces every untouched byte of the input, comments and quoting included.
///
/// ```
/// use stack_config_edit::{ConfigDocument, ConfigValue};
///
/// let mut doc: ConfigDocument = "config:\n  region: us-east-1 # default\n".parse().unwrap();
/// doc.set("config", "region", &ConfigValue::plain("us-west-2"), 3).unwrap();
/// doc.set("config", "token", &ConfigValue::secure("AAAB=="), 3).unwrap();
/// assert_eq!(
///     String::from_utf8(doc.serialize()).unwrap(),
///     "config:\n  region: us-west-2 # default\n  token:\n    secure: AAAB==\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    tree: Option<Yaml>,
}

impl ConfigDocument {
    /// Parse configuration bytes. `None` means there is no configuration yet
    /// and gives an empty document.
    pub fn parse(bytes: Option<&[u8]>) -> YamlResult<Self> {
        let Some(bytes) = bytes else {
            debug!("no configuration input, starting from an empty document");
            return Ok(Self::default());
        };
        let text = std::str::from_utf8(bytes).map_err(|err| ParseError::invalid_utf8(bytes, err))?;
        let tree = Yaml::from_str(text)?;
        debug!(documents = tree.documents().count(), "parsed configuration");
        Ok(Self { tree: Some(tree) })
    }

    /// Whether there is no document at all, as opposed to a document without entries.
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    /// The text of the whole stream, including anything outside the first
    /// document. Empty for an empty document.
    pub fn serialize(&self) -> Vec<u8> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        tree.to_string().into_bytes()
    }

    /// The body of the first document, if it has one and it is a mapping.
    ///
    /// A first document whose body is a sequence or a scalar is an error.
    pub fn root_mapping(&self) -> YamlResult<Option<Mapping>> {
        let Some(body) = self
            .tree
            .as_ref()
            .and_then(|tree| tree.document())
            .and_then(|doc| doc.body())
        else {
            return Ok(None);
        };
        let found = node_shape(&body);
        match Mapping::cast(body) {
            Some(mapping) => Ok(Some(mapping)),
            None => Err(YamlError::TypeMismatch {
                segment: String::new(),
                found,
            }),
        }
    }

    /// Set `key` in the mapping at `key_path` to `value`.
    ///
    /// New keys are laid out from `column`, see [`crate::EntryLayout`].
    /// Does nothing if the document has no content.
    pub fn set(
        &mut self,
        key_path: &str,
        key: &str,
        value: &ConfigValue,
        column: usize,
    ) -> YamlResult<()> {
        let Some(root) = self.root_mapping()? else {
            debug!(key_path, key, "document has no content, not setting key");
            return Ok(());
        };
        resolve(&root, key_path)?.set(key, value, column);
        Ok(())
    }

    /// Remove `key` from the mapping at `key_path`.
    ///
    /// A missing key is not an error. Does nothing if the document has no content.
    pub fn delete(&mut self, key_path: &str, key: &str) -> YamlResult<()> {
        let Some(root) = self.root_mapping()? else {
            debug!(key_path, key, "document has no content, not deleting key");
            return Ok(());
        };
        resolve(&root, key_path)?.delete(key);
        Ok(())
    }

    /// Read back the value of `key` in the mapping at `key_path`.
    pub fn get(&self, key_path: &str, key: &str) -> YamlResult<Option<ConfigValue>> {
        let Some(root) = self.root_mapping()? else {
            return Ok(None);
        };
        Ok(resolve(&root, key_path)?
            .find(key)
            .and_then(|entry| entry.config_value()))
    }

    /// Keys of the mapping at `key_path`, in document order.
    pub fn keys(&self, key_path: &str) -> YamlResult<Vec<String>> {
        let Some(root) = self.root_mapping()? else {
            return Ok(Vec::new());
        };
        Ok(resolve(&root, key_path)?.keys())
    }

    /// Column of the first key in the mapping at `key_path`, if it has any keys.
    pub fn entry_column(&self, key_path: &str) -> YamlResult<Option<usize>> {
        let Some(root) = self.root_mapping()? else {
            return Ok(None);
        };
        Ok(resolve(&root, key_path)?.entry_column())
    }
}

impl FromStr for ConfigDocument {
    type Err = YamlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(Some(s.as_bytes()))
    }
}
