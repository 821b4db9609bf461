//! Construction of new entries and values as detached syntax nodes.
//!
//! Nodes built here are mutable roots, ready to be spliced into a parsed tree.

use crate::lex::SyntaxKind::{self, *};
use crate::scalar::{ScalarStyle, ScalarValue};
use crate::value::ConfigValue;
use crate::yaml::{SyntaxElement, SyntaxNode};
use rowan::GreenNodeBuilder;

/// Columns used when laying out a new entry in a block mapping.
///
/// All columns are 1-based. A token placed at column `c` at the start of a
/// line is preceded by `c - 1` spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLayout {
    /// Column of the entry's key
    pub key: usize,
    /// Column of the nested `secure` key of a secure value
    pub secure_key: usize,
    /// Column of a secure value's text
    pub secure_value: usize,
}

impl EntryLayout {
    /// Offset of the `secure` key from the entry's key.
    pub const SECURE_KEY_OFFSET: usize = 2;
    /// Offset of a secure value's text from the entry's key.
    pub const SECURE_VALUE_OFFSET: usize = 4;

    /// Layout for an entry whose key sits at `column`. Column 0 is treated as 1.
    pub fn at(column: usize) -> Self {
        let key = column.max(1);
        Self {
            key,
            secure_key: key + Self::SECURE_KEY_OFFSET,
            secure_value: key + Self::SECURE_VALUE_OFFSET,
        }
    }

    /// Column of the lines of a multi-line plain value.
    pub fn plain_value(&self) -> usize {
        self.key + Self::SECURE_KEY_OFFSET
    }
}

fn build(f: impl FnOnce(&mut GreenNodeBuilder<'static>)) -> SyntaxNode {
    let mut builder = GreenNodeBuilder::new();
    f(&mut builder);
    SyntaxNode::new_root_mut(builder.finish())
}

/// Loose tokens, ready for `splice_children`.
pub(crate) fn tokens(parts: &[(SyntaxKind, &str)]) -> Vec<SyntaxElement> {
    let wrapper = build(|builder| {
        builder.start_node(ROOT.into());
        for (kind, text) in parts {
            builder.token((*kind).into(), text);
        }
        builder.finish_node();
    });
    wrapper.children_with_tokens().collect()
}

/// Line break followed by the indentation for `column`.
pub(crate) fn line_start(newline: &str, column: usize) -> Vec<SyntaxElement> {
    let indent = " ".repeat(column.max(1) - 1);
    if indent.is_empty() {
        tokens(&[(NEWLINE, newline)])
    } else {
        tokens(&[(NEWLINE, newline), (INDENT, &indent)])
    }
}

fn push_indent(builder: &mut GreenNodeBuilder<'static>, column: usize) {
    if column > 1 {
        builder.token(INDENT.into(), &" ".repeat(column - 1));
    }
}

fn push_scalar(
    builder: &mut GreenNodeBuilder<'static>,
    value: &ScalarValue,
    content_column: usize,
    newline: &str,
) {
    builder.start_node(SCALAR.into());
    match value.style() {
        ScalarStyle::Literal => {
            builder.token(PIPE.into(), value.literal_header());
            for line in value.literal_lines() {
                builder.token(NEWLINE.into(), newline);
                if !line.is_empty() {
                    push_indent(builder, content_column);
                    builder.token(BLOCK_TEXT.into(), line);
                }
            }
        }
        ScalarStyle::Plain => builder.token(STRING.into(), value.value()),
        ScalarStyle::SingleQuoted => builder.token(SINGLE_QUOTED.into(), &value.to_yaml_string()),
        ScalarStyle::DoubleQuoted => builder.token(DOUBLE_QUOTED.into(), &value.to_yaml_string()),
    }
    builder.finish_node();
}

fn push_key(builder: &mut GreenNodeBuilder<'static>, key: &str, flow: bool) {
    builder.start_node(KEY.into());
    push_scalar(builder, &ScalarValue::key(key, flow), 1, "\n");
    builder.finish_node();
}

fn push_separator(builder: &mut GreenNodeBuilder<'static>) {
    builder.token(COLON.into(), ":");
    builder.token(WHITESPACE.into(), " ");
}

/// `secure: <text>` as a mapping entry.
fn push_secure_entry(
    builder: &mut GreenNodeBuilder<'static>,
    cipher_text: &ScalarValue,
    content_column: usize,
    newline: &str,
) {
    builder.start_node(MAPPING_ENTRY.into());
    push_key(builder, ConfigValue::SECURE_KEY, false);
    push_separator(builder);
    builder.start_node(VALUE.into());
    push_scalar(builder, cipher_text, content_column, newline);
    builder.finish_node();
    builder.finish_node();
}

fn push_block_value(
    builder: &mut GreenNodeBuilder<'static>,
    value: &ConfigValue,
    layout: &EntryLayout,
    newline: &str,
) {
    builder.start_node(VALUE.into());
    match value {
        ConfigValue::Plain(text) => {
            push_scalar(builder, &ScalarValue::new(text.as_str()), layout.plain_value(), newline)
        }
        ConfigValue::Secure(text) => {
            builder.token(NEWLINE.into(), newline);
            push_indent(builder, layout.secure_key);
            builder.start_node(MAPPING.into());
            push_secure_entry(
                builder,
                &ScalarValue::new(text.as_str()),
                layout.secure_value,
                newline,
            );
            builder.finish_node();
        }
    }
    builder.finish_node();
}

fn push_flow_value(builder: &mut GreenNodeBuilder<'static>, value: &ConfigValue) {
    builder.start_node(VALUE.into());
    match value {
        ConfigValue::Plain(text) => push_scalar(builder, &ScalarValue::flow(text.as_str()), 1, "\n"),
        ConfigValue::Secure(text) => {
            builder.start_node(MAPPING.into());
            builder.token(LEFT_BRACE.into(), "{");
            push_secure_entry(builder, &ScalarValue::flow(text.as_str()), 1, "\n");
            builder.token(RIGHT_BRACE.into(), "}");
            builder.finish_node();
        }
    }
    builder.finish_node();
}

/// Whether a block value of this kind follows its `:` on the same line.
pub(crate) fn is_inline_in_block(value: &ConfigValue) -> bool {
    !value.is_secure()
}

/// A `VALUE` node for an entry of a block mapping.
///
/// Plain values are a single scalar. Secure values start on a new line with
/// the `secure` key at `layout.secure_key`.
pub(crate) fn block_value(value: &ConfigValue, layout: &EntryLayout, newline: &str) -> SyntaxNode {
    build(|builder| push_block_value(builder, value, layout, newline))
}

/// A `VALUE` node for an entry of a flow mapping.
pub(crate) fn flow_value(value: &ConfigValue) -> SyntaxNode {
    build(|builder| push_flow_value(builder, value))
}

/// A `VALUE` node holding an empty flow mapping, `{}`.
pub(crate) fn empty_mapping_value() -> SyntaxNode {
    build(|builder| {
        builder.start_node(VALUE.into());
        builder.start_node(MAPPING.into());
        builder.token(LEFT_BRACE.into(), "{");
        builder.token(RIGHT_BRACE.into(), "}");
        builder.finish_node();
        builder.finish_node();
    })
}

/// A complete entry for a block mapping, without the surrounding line break.
pub(crate) fn block_entry(
    key: &str,
    value: &ConfigValue,
    layout: &EntryLayout,
    newline: &str,
) -> SyntaxNode {
    build(|builder| {
        builder.start_node(MAPPING_ENTRY.into());
        push_key(builder, key, false);
        builder.token(COLON.into(), ":");
        if is_inline_in_block(value) {
            builder.token(WHITESPACE.into(), " ");
        }
        push_block_value(builder, value, layout, newline);
        builder.finish_node();
    })
}

/// A complete entry for a flow mapping, without the surrounding `, `.
pub(crate) fn flow_entry(key: &str, value: &ConfigValue) -> SyntaxNode {
    build(|builder| {
        builder.start_node(MAPPING_ENTRY.into());
        push_key(builder, key, true);
        push_separator(builder);
        push_flow_value(builder, value);
        builder.finish_node();
    })
}
