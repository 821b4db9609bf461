#![warn(missing_docs)]
#![warn(clippy::unnecessary_to_owned)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::manual_string_new)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

//! Format-preserving editing of YAML stack configuration files.
//!
//! Files are parsed into a lossless syntax tree based on the [rowan]
//! library. Setting or deleting a key splices new nodes into that tree, so
//! the rest of the file comes back byte for byte when it is serialized.

mod builder;
mod document;
mod error;
mod lex;
mod mutation;
mod parse;
mod path;
mod position;
mod scalar;
mod value;
mod yaml;

pub use builder::EntryLayout;
pub use document::ConfigDocument;
pub use error::{ParseError, PositionedParseError, YamlError, YamlResult};
pub use lex::{lex, SyntaxKind};
pub use parse::Parse;
pub use path::{resolve, KeyPath};
pub use position::{LineIndex, Position};
pub use rowan::TextRange;
pub use scalar::{ScalarStyle, ScalarValue};
pub use value::ConfigValue;
pub use yaml::{Document, Lang, Mapping, MappingEntry, Scalar, Sequence, Yaml};
