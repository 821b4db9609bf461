//! In-place editing of mapping entries.
//!
//! Edits splice freshly built nodes into the existing tree, so everything
//! outside the touched entry keeps its exact text.

use crate::builder::{self, EntryLayout};
use crate::lex::SyntaxKind::{self, *};
use crate::value::ConfigValue;
use crate::yaml::{Mapping, MappingEntry, SyntaxElement, SyntaxNode};
use rowan::ast::AstNode;
use std::ops::Range;
use tracing::debug;

fn kind_at(children: &[SyntaxElement], index: usize) -> Option<SyntaxKind> {
    children.get(index).map(|element| element.kind())
}

/// Remove the children of `node` in `range`.
///
/// `splice_children` stops at the first child it detaches, so wider ranges
/// are taken apart one element at a time.
fn remove_children(node: &SyntaxNode, range: Range<usize>) {
    for _ in range.clone() {
        node.splice_children(range.start..range.start + 1, Vec::new());
    }
}

/// Move `trivia` in front of the first line break of `value`.
///
/// A comment trailing the old value then ends the header line of the new one
/// instead of landing on its last line.
fn move_before_line_break(value: &SyntaxNode, trivia: Vec<SyntaxElement>) {
    let line_break = value
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == NEWLINE);
    if let Some(token) = line_break {
        if let Some(parent) = token.parent() {
            parent.splice_children(token.index()..token.index(), trivia);
        }
    }
}

/// Put `new_value` in place of the value of `entry`.
///
/// An inline value is separated from the `:` by a space; a value starting
/// on its own line follows the `:` directly.
fn replace_value(entry: &SyntaxNode, new_value: SyntaxNode, inline: bool) {
    let children: Vec<SyntaxElement> = entry.children_with_tokens().collect();
    let Some(index) = children.iter().position(|child| child.kind() == VALUE) else {
        let mut elements = Vec::new();
        if !children.iter().any(|child| child.kind() == COLON) {
            elements.extend(builder::tokens(&[(COLON, ":")]));
        }
        elements.extend(builder::tokens(&[(WHITESPACE, " ")]));
        elements.push(new_value.into());
        entry.splice_children(children.len()..children.len(), elements);
        return;
    };
    let trailing: Vec<SyntaxElement> = children[index + 1..]
        .iter()
        .take_while(|child| matches!(child.kind(), WHITESPACE | COMMENT))
        .cloned()
        .collect();
    if !trailing.is_empty() && new_value.descendants_with_tokens().any(|element| element.kind() == NEWLINE) {
        move_before_line_break(&new_value, trailing);
    }

    let spaced = index > 0 && kind_at(&children, index - 1) == Some(WHITESPACE);
    let start = if !inline && spaced { index - 1 } else { index };
    remove_children(entry, start..index);
    let mut elements = if inline && !spaced {
        builder::tokens(&[(WHITESPACE, " ")])
    } else {
        Vec::new()
    };
    elements.push(new_value.into());
    entry.splice_children(start..start + 1, elements);
}

impl Mapping {
    /// Find the first entry whose key is `key`.
    pub fn find(&self, key: &str) -> Option<MappingEntry> {
        self.entries()
            .find(|entry| entry.key_text().as_deref() == Some(key))
    }

    /// Set `key` to `value`.
    ///
    /// An existing entry keeps its key and position and only has its value
    /// replaced. A missing key is appended after the last entry; in a block
    /// mapping it is laid out from `column` (see [`EntryLayout`]), in a flow
    /// mapping it is written as `key: value` and `column` is ignored.
    pub fn set(&mut self, key: &str, value: &ConfigValue, column: usize) {
        let layout = EntryLayout::at(column);
        let flow = self.is_flow();
        let newline = self.line_ending();
        if let Some(mut entry) = self.find(key) {
            debug!(key, secure = value.is_secure(), "replacing config value");
            entry.set_value(value, flow, &layout, &newline);
        } else if flow {
            debug!(key, secure = value.is_secure(), "appending flow entry");
            self.push_flow_entry(key, value);
        } else {
            debug!(key, secure = value.is_secure(), column = layout.key, "appending block entry");
            self.push_block_entry(key, value, &layout, &newline);
        }
    }

    /// Remove the first entry whose key is `key`, along with its line break.
    ///
    /// Returns `false` and leaves the mapping untouched if there is no such key.
    /// Emptying a nested block mapping leaves `{}` as its parent's value.
    pub fn delete(&mut self, key: &str) -> bool {
        let Some(entry) = self.find(key) else {
            debug!(key, "key not present, nothing to delete");
            return false;
        };
        debug!(key, "deleting config value");
        if self.is_flow() {
            self.remove_flow_entry(&entry);
        } else {
            self.remove_block_entry(&entry);
        }
        true
    }

    /// Line ending used by the document, `\n` if it has none yet.
    fn line_ending(&self) -> String {
        let root = self.0.ancestors().last().unwrap_or_else(|| self.0.clone());
        root.descendants_with_tokens()
            .filter_map(|element| element.into_token())
            .find(|token| token.kind() == NEWLINE)
            .map_or_else(|| "\n".to_string(), |token| token.text().to_string())
    }

    fn push_block_entry(&self, key: &str, value: &ConfigValue, layout: &EntryLayout, newline: &str) {
        let entry = builder::block_entry(key, value, layout, newline);
        let end = self.0.children_with_tokens().count();
        let mut elements = if self.is_empty() {
            Vec::new()
        } else {
            builder::line_start(newline, layout.key)
        };
        elements.push(entry.into());
        self.0.splice_children(end..end, elements);
    }

    fn push_flow_entry(&self, key: &str, value: &ConfigValue) {
        let entry = builder::flow_entry(key, value);
        let (index, mut elements) = match self.entries().last() {
            Some(last) => (
                last.syntax().index() + 1,
                builder::tokens(&[(COMMA, ","), (WHITESPACE, " ")]),
            ),
            None => {
                let open = self
                    .0
                    .children_with_tokens()
                    .position(|child| child.kind() == LEFT_BRACE)
                    .unwrap_or(0);
                (open + 1, Vec::new())
            }
        };
        elements.push(entry.into());
        self.0.splice_children(index..index, elements);
    }

    fn remove_block_entry(&self, entry: &MappingEntry) {
        let children: Vec<SyntaxElement> = self.0.children_with_tokens().collect();
        let index = entry.syntax().index();
        let first_entry = children
            .iter()
            .position(|child| child.kind() == MAPPING_ENTRY);

        if self.len() == 1 {
            self.0.splice_children(index..index + 1, Vec::new());
            self.collapse_into_parent();
        } else if first_entry == Some(index) {
            let mut end = index + 1;
            if kind_at(&children, end) == Some(NEWLINE) {
                end += 1;
                if kind_at(&children, end) == Some(INDENT) {
                    end += 1;
                }
            }
            remove_children(&self.0, index..end);
        } else {
            let mut start = index;
            if start > 0 && kind_at(&children, start - 1) == Some(INDENT) {
                start -= 1;
            }
            if start > 0 && kind_at(&children, start - 1) == Some(NEWLINE) {
                start -= 1;
            }
            remove_children(&self.0, start..index + 1);
        }
    }

    /// Give an emptied nested mapping the value `{}`, so its key stays a mapping.
    fn collapse_into_parent(&self) {
        let Some(value) = self.0.parent().filter(|parent| parent.kind() == VALUE) else {
            return;
        };
        if let Some(entry) = value.parent() {
            replace_value(&entry, builder::empty_mapping_value(), true);
        }
    }

    fn remove_flow_entry(&self, entry: &MappingEntry) {
        let children: Vec<SyntaxElement> = self.0.children_with_tokens().collect();
        let index = entry.syntax().index();
        let next = (index + 1..children.len()).find(|&i| !children[i].kind().is_trivia());

        if let Some(comma) = next.filter(|&i| children[i].kind() == COMMA) {
            let end = (comma + 1..children.len())
                .find(|&i| !children[i].kind().is_trivia())
                .unwrap_or(children.len());
            remove_children(&self.0, index..end);
            return;
        }
        let previous = (0..index).rev().find(|&i| !children[i].kind().is_trivia());
        match previous.filter(|&i| children[i].kind() == COMMA) {
            Some(comma) => remove_children(&self.0, comma..index + 1),
            None => self.0.splice_children(index..index + 1, Vec::new()),
        }
    }
}

impl MappingEntry {
    /// The value of this entry as a [`ConfigValue`], in either of its two shapes.
    pub fn config_value(&self) -> Option<ConfigValue> {
        ConfigValue::from_value_node(&self.value()?)
    }

    /// Replace the value of this entry, keeping its key.
    ///
    /// `flow` selects the layout for an entry of a flow mapping.
    pub fn set_value(&mut self, value: &ConfigValue, flow: bool, layout: &EntryLayout, newline: &str) {
        if flow {
            replace_value(&self.0, builder::flow_value(value), true);
        } else {
            replace_value(
                &self.0,
                builder::block_value(value, layout, newline),
                builder::is_inline_in_block(value),
            );
        }
    }
}
