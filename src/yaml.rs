//! Lossless YAML parser and syntax tree wrappers.

use crate::{
    error::{ParseError, PositionedParseError},
    lex::{lex, SyntaxKind},
    parse::Parse,
    position::LineIndex,
    scalar,
};
use rowan::ast::AstNode;
use rowan::{GreenNodeBuilder, TextRange, TextSize};
use std::str::FromStr;
use tracing::trace;

use SyntaxKind::*;

/// Output of the parser: the green tree plus any syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ParsedYaml {
    pub(crate) green_node: rowan::GreenNode,
    pub(crate) errors: Vec<PositionedParseError>,
}

/// YAML language type for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lang {}

impl rowan::Language for Lang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= COMMENT as u16, "unknown syntax kind {}", raw.0);
        // SAFETY: SyntaxKind is repr(u16) with contiguous discriminants up to COMMENT.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub(crate) type SyntaxNode = rowan::SyntaxNode<Lang>;
pub(crate) type SyntaxElement = rowan::SyntaxElement<Lang>;

/// A macro to create AST node wrappers.
macro_rules! ast_node {
    ($ast:ident, $kind:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $ast(pub(crate) SyntaxNode);

        impl std::fmt::Debug for $ast {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($ast))
                    .field("syntax", &self.0)
                    .finish()
            }
        }

        impl AstNode for $ast {
            type Language = Lang;

            fn can_cast(kind: SyntaxKind) -> bool {
                kind == SyntaxKind::$kind
            }

            fn cast(syntax: SyntaxNode) -> Option<Self> {
                if Self::can_cast(syntax.kind()) {
                    Some(Self(syntax))
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.0
            }
        }

        impl From<SyntaxNode> for $ast {
            fn from(node: SyntaxNode) -> Self {
                $ast(node)
            }
        }

        impl std::fmt::Display for $ast {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0.text())
            }
        }
    };
}

ast_node!(
    Yaml,
    ROOT,
    "A YAML stream containing zero or more documents"
);
ast_node!(Document, DOCUMENT, "A single YAML document");
ast_node!(Mapping, MAPPING, "A YAML mapping (key-value pairs)");
ast_node!(
    MappingEntry,
    MAPPING_ENTRY,
    "A key-value pair in a YAML mapping"
);
ast_node!(Sequence, SEQUENCE, "A YAML sequence (list)");
ast_node!(Scalar, SCALAR, "A YAML scalar value");

/// Short name for the shape of a value node, used in error messages.
pub(crate) fn node_shape(node: &SyntaxNode) -> &'static str {
    match node.kind() {
        MAPPING => "mapping",
        SEQUENCE => "sequence",
        SCALAR => "scalar",
        _ => "null",
    }
}

/// First content node (mapping, sequence or scalar) among the children of `node`.
fn content_child(node: &SyntaxNode) -> Option<SyntaxNode> {
    node.children()
        .find(|child| matches!(child.kind(), MAPPING | SEQUENCE | SCALAR))
}

impl Yaml {
    /// Parse YAML text, keeping every byte of it in the tree.
    pub fn parse(text: &str) -> Parse<Yaml> {
        Parse::parse_yaml(text)
    }

    /// Returns an iterator over all documents in the stream.
    pub fn documents(&self) -> impl Iterator<Item = Document> {
        self.0.children().filter_map(Document::cast)
    }

    /// The first document, if any.
    pub fn document(&self) -> Option<Document> {
        self.documents().next()
    }
}

impl FromStr for Yaml {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Yaml::parse(s).to_result()
    }
}

impl Document {
    /// The top-level node of this document, if it has one.
    pub fn body(&self) -> Option<SyntaxNode> {
        content_child(&self.0)
    }

    /// The top-level mapping of this document, if its body is a mapping.
    pub fn as_mapping(&self) -> Option<Mapping> {
        self.body().and_then(Mapping::cast)
    }
}

impl Mapping {
    /// Entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = MappingEntry> {
        self.0.children().filter_map(MappingEntry::cast)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Whether this is a flow mapping written with braces.
    pub fn is_flow(&self) -> bool {
        self.0
            .children_with_tokens()
            .next()
            .map_or(false, |first| first.kind() == LEFT_BRACE)
    }

    /// Keys of all entries, in document order.
    pub fn keys(&self) -> Vec<String> {
        self.entries().filter_map(|entry| entry.key_text()).collect()
    }

    /// 1-based column of the first entry's key.
    pub fn entry_column(&self) -> Option<usize> {
        let first = self.entries().next()?;
        let root = self.0.ancestors().last()?;
        let text = root.text().to_string();
        let offset = usize::from(first.syntax().text_range().start());
        Some(LineIndex::new(&text).position(offset).column)
    }
}

impl MappingEntry {
    /// The key scalar.
    pub fn key(&self) -> Option<Scalar> {
        self.0
            .children()
            .find(|child| child.kind() == KEY)
            .and_then(|key| key.children().find_map(Scalar::cast))
    }

    /// The decoded key text.
    pub fn key_text(&self) -> Option<String> {
        self.key().map(|key| key.as_string())
    }

    /// The `VALUE` node of this entry, which may be empty.
    pub(crate) fn value_node(&self) -> Option<SyntaxNode> {
        self.0.children().find(|child| child.kind() == VALUE)
    }

    /// The value node: a mapping, sequence or scalar. `None` for a null value.
    pub fn value(&self) -> Option<SyntaxNode> {
        self.value_node().as_ref().and_then(content_child)
    }

    /// The value, if it is a mapping.
    pub fn value_mapping(&self) -> Option<Mapping> {
        self.value().and_then(Mapping::cast)
    }
}

impl Sequence {
    /// Item nodes in document order. Null items are skipped.
    pub fn items(&self) -> impl Iterator<Item = SyntaxNode> {
        self.0
            .children()
            .filter(|child| child.kind() == SEQUENCE_ENTRY)
            .filter_map(|entry| entry.children().find(|child| child.kind() == VALUE))
            .filter_map(|value| content_child(&value))
    }
}

impl Scalar {
    /// The scalar's value with quoting, escapes and line folding resolved.
    pub fn as_string(&self) -> String {
        let text = self.0.text().to_string();
        match self.0.first_token().map(|token| token.kind()) {
            Some(SINGLE_QUOTED) => scalar::unquote_single(&text),
            Some(DOUBLE_QUOTED) => scalar::unquote_double(&text),
            Some(PIPE | GREATER) => scalar::decode_block(&text),
            Some(STRING) => scalar::fold_lines(&text),
            _ => text,
        }
    }

    /// Whether the scalar is written with quotes.
    pub fn is_quoted(&self) -> bool {
        matches!(
            self.0.first_token().map(|token| token.kind()),
            Some(SINGLE_QUOTED | DOUBLE_QUOTED)
        )
    }
}

/// The first line after the cursor holding something other than whitespace or comments.
struct ContentLine {
    /// Tokens to bump before the line's first content token.
    skip: usize,
    indent: usize,
    tab_indent: bool,
    crosses_comment: bool,
    kind: SyntaxKind,
}

impl ContentLine {
    fn ends_block(&self, indent: usize) -> bool {
        self.indent < indent || matches!(self.kind, DOC_START | DOC_END | DIRECTIVE)
    }
}

/// Internal parser state
struct Parser<'a> {
    /// Remaining tokens, reversed so the next token can be popped.
    tokens: Vec<(SyntaxKind, &'a str)>,
    builder: GreenNodeBuilder<'static>,
    offset: usize,
    line_index: LineIndex<'a>,
    errors: Vec<PositionedParseError>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        let mut tokens = lex(text);
        tokens.reverse();
        Self {
            tokens,
            builder: GreenNodeBuilder::new(),
            offset: 0,
            line_index: LineIndex::new(text),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> ParsedYaml {
        self.builder.start_node(ROOT.into());
        loop {
            self.skip_trivia();
            match self.current() {
                None => break,
                Some(DIRECTIVE) => self.bump(),
                Some(_) => self.parse_document(),
            }
        }
        self.builder.finish_node();
        ParsedYaml {
            green_node: self.builder.finish(),
            errors: self.errors,
        }
    }

    fn current(&self) -> Option<SyntaxKind> {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> Option<SyntaxKind> {
        self.tokens
            .len()
            .checked_sub(n + 1)
            .map(|i| self.tokens[i].0)
    }

    fn nth_text(&self, n: usize) -> Option<&'a str> {
        self.tokens
            .len()
            .checked_sub(n + 1)
            .map(|i| self.tokens[i].1)
    }

    fn bump(&mut self) {
        if let Some((kind, text)) = self.tokens.pop() {
            self.builder.token(kind.into(), text);
            self.offset += text.len();
        }
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn at_line_end(&self) -> bool {
        matches!(self.current(), None | Some(NEWLINE))
    }

    /// Indentation of the current token within its line.
    fn column(&self) -> usize {
        self.offset - self.line_index.line_start(self.offset)
    }

    fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        let len = self.nth_text(0).map_or(0, str::len);
        let start = TextSize::try_from(self.offset).unwrap_or_default();
        let end = TextSize::try_from(self.offset + len).unwrap_or(start);
        let position = self.line_index.position(self.offset);
        trace!(%position, %message, "syntax error");
        self.errors.push(PositionedParseError {
            message,
            range: TextRange::new(start, end),
            position,
        });
    }

    /// Report an error and wrap the rest of the line in an ERROR node.
    fn error_line(&mut self, message: &str) {
        self.error(message);
        self.builder.start_node(ERROR.into());
        while !self.at_line_end() {
            self.bump();
        }
        self.builder.finish_node();
    }

    fn error_token(&mut self, message: &str) {
        self.error(message);
        self.builder.start_node(ERROR.into());
        self.bump();
        self.builder.finish_node();
    }

    fn skip_trivia(&mut self) {
        while self.current().map_or(false, SyntaxKind::is_trivia) {
            self.bump();
        }
    }

    fn skip_inline_trivia(&mut self) {
        while matches!(self.current(), Some(WHITESPACE | COMMENT)) {
            self.bump();
        }
    }

    fn rest_of_line_is_trivia(&self) -> bool {
        let mut n = 0;
        loop {
            match self.nth(n) {
                None | Some(NEWLINE) => return true,
                Some(WHITESPACE | COMMENT) => n += 1,
                Some(_) => return false,
            }
        }
    }

    fn peek_content_line(&self) -> Option<ContentLine> {
        if self.current() != Some(NEWLINE) {
            return None;
        }
        let mut n = 0;
        let mut indent = 0;
        let mut tab_indent = false;
        let mut crosses_comment = false;
        loop {
            match self.nth(n)? {
                NEWLINE => {
                    indent = 0;
                    tab_indent = false;
                }
                INDENT => {
                    let text = self.nth_text(n)?;
                    indent = text.len();
                    tab_indent = text.contains('\t');
                }
                COMMENT => crosses_comment = true,
                WHITESPACE => {}
                kind => {
                    return Some(ContentLine {
                        skip: n,
                        indent,
                        tab_indent,
                        crosses_comment,
                        kind,
                    })
                }
            }
            n += 1;
        }
    }

    fn commit_line(&mut self, line: &ContentLine) {
        self.bump_n(line.skip);
        if line.tab_indent {
            self.error("tab characters are not allowed for indentation");
        }
    }

    /// Whether the tokens from `n` on form an implicit key followed by `:`.
    fn is_mapping_key_at(&self, mut n: usize) -> bool {
        if !self.nth(n).map_or(false, SyntaxKind::is_scalar_text) {
            return false;
        }
        loop {
            n += 1;
            match self.nth(n) {
                Some(COLON) => return true,
                Some(STRING | SINGLE_QUOTED | DOUBLE_QUOTED | WHITESPACE) => {}
                _ => return false,
            }
        }
    }

    fn parse_document(&mut self) {
        self.builder.start_node(DOCUMENT.into());
        let mut has_body = false;
        if self.current() == Some(DOC_START) {
            self.bump();
            self.skip_inline_trivia();
            if !self.at_line_end() {
                self.parse_inline_value(None);
                self.finish_line();
                has_body = true;
            }
        }
        if !has_body {
            self.skip_trivia();
            if !matches!(self.current(), None | Some(DOC_START | DOC_END | DIRECTIVE)) {
                self.parse_block_node(None);
            }
        }
        loop {
            self.skip_trivia();
            match self.current() {
                None | Some(DOC_START | DIRECTIVE) => break,
                Some(DOC_END) => {
                    self.bump();
                    self.skip_inline_trivia();
                    break;
                }
                Some(_) => self.error_line("unexpected content after the document body"),
            }
        }
        self.builder.finish_node();
    }

    /// Parse the block node starting at the current token.
    ///
    /// `parent` is the indentation of the enclosing block, if any.
    fn parse_block_node(&mut self, parent: Option<usize>) {
        let indent = self.column();
        match self.current() {
            Some(DASH) => self.parse_block_sequence(indent),
            Some(QUESTION) => self.error_line("explicit mapping keys are not supported"),
            _ if self.is_mapping_key_at(0) => self.parse_block_mapping(indent),
            _ => self.parse_inline_value(parent),
        }
    }

    /// Parse a block node on the lines following the cursor, if one is there.
    fn parse_nested_block(&mut self, parent: Option<usize>, same_indent_sequence: bool) {
        let Some(line) = self.peek_content_line() else {
            return;
        };
        if matches!(line.kind, DOC_START | DOC_END | DIRECTIVE) {
            return;
        }
        let deeper = parent.map_or(true, |parent| line.indent > parent);
        let sequence_here =
            same_indent_sequence && Some(line.indent) == parent && line.kind == DASH;
        if deeper || sequence_here {
            self.commit_line(&line);
            self.parse_block_node(parent);
        }
    }

    fn parse_block_mapping(&mut self, indent: usize) {
        self.builder.start_node(MAPPING.into());
        self.parse_mapping_entry(indent);
        while let Some(line) = self.peek_content_line() {
            if line.ends_block(indent) {
                break;
            }
            self.commit_line(&line);
            if line.indent == indent && self.is_mapping_key_at(0) {
                self.parse_mapping_entry(indent);
            } else if line.indent > indent {
                self.error_line("unexpected indentation");
            } else if self.current() == Some(QUESTION) {
                self.error_line("explicit mapping keys are not supported");
            } else {
                self.error_line("expected a mapping key followed by ':'");
            }
        }
        self.builder.finish_node();
    }

    fn parse_mapping_entry(&mut self, indent: usize) {
        self.builder.start_node(MAPPING_ENTRY.into());
        self.builder.start_node(KEY.into());
        self.parse_words();
        self.builder.finish_node();
        if self.current() == Some(WHITESPACE) {
            self.bump();
        }
        if self.current() == Some(COLON) {
            self.bump();
        } else {
            self.error("expected ':' after mapping key");
        }
        self.parse_entry_value(indent, true);
        self.finish_line();
        self.builder.finish_node();
    }

    /// Parse the value after a `:` or `-` indicator.
    fn parse_entry_value(&mut self, indent: usize, same_indent_sequence: bool) {
        if self.rest_of_line_is_trivia() {
            self.builder.start_node(VALUE.into());
            self.skip_inline_trivia();
            self.parse_nested_block(Some(indent), same_indent_sequence);
            self.builder.finish_node();
            return;
        }
        if self.current() == Some(WHITESPACE) {
            self.bump();
        }
        self.builder.start_node(VALUE.into());
        self.parse_inline_value(Some(indent));
        self.builder.finish_node();
    }

    fn finish_line(&mut self) {
        self.skip_inline_trivia();
        if self.at_line_end() {
            return;
        }
        if self.current() == Some(COLON) {
            self.error_line("mapping values are not allowed on this line");
        } else {
            self.error_line("unexpected content after value");
        }
    }

    /// Parse a value that starts on the current line.
    fn parse_inline_value(&mut self, parent: Option<usize>) {
        match self.current() {
            Some(ANCHOR | TAG) => {
                self.bump();
                if self.rest_of_line_is_trivia() {
                    self.skip_inline_trivia();
                    self.parse_nested_block(parent, false);
                } else {
                    if self.current() == Some(WHITESPACE) {
                        self.bump();
                    }
                    self.parse_inline_value(parent);
                }
            }
            Some(REFERENCE) => {
                self.builder.start_node(SCALAR.into());
                self.bump();
                self.builder.finish_node();
            }
            Some(LEFT_BRACE) => self.parse_flow_mapping(),
            Some(LEFT_BRACKET) => self.parse_flow_sequence(),
            Some(PIPE | GREATER) => self.parse_block_scalar(),
            Some(STRING | SINGLE_QUOTED | DOUBLE_QUOTED) => self.parse_scalar(parent),
            Some(UNTERMINATED) => {
                self.error("unterminated quoted scalar");
                self.builder.start_node(SCALAR.into());
                self.bump();
                self.builder.finish_node();
            }
            Some(DASH) => self.error_line("block sequence entries are not allowed on this line"),
            Some(COLON) => self.error_line("missing mapping key before ':'"),
            _ => self.error_line("unexpected token"),
        }
    }

    /// Words of a plain scalar on the current line.
    fn parse_words(&mut self) {
        self.builder.start_node(SCALAR.into());
        self.bump();
        self.bump_words();
        self.builder.finish_node();
    }

    fn bump_words(&mut self) {
        while self.nth(0) == Some(WHITESPACE) && self.nth(1) == Some(STRING) {
            self.bump_n(2);
        }
    }

    fn parse_scalar(&mut self, parent: Option<usize>) {
        self.builder.start_node(SCALAR.into());
        let plain = self.current() == Some(STRING);
        self.bump();
        if plain {
            self.bump_words();
            while let Some(skip) = self.plain_continuation(parent) {
                self.bump_n(skip + 1);
                self.bump_words();
            }
        }
        self.builder.finish_node();
    }

    /// Tokens to skip to reach the next line of a multi-line plain scalar.
    fn plain_continuation(&self, parent: Option<usize>) -> Option<usize> {
        let line = self.peek_content_line()?;
        if line.kind != STRING || line.tab_indent || line.crosses_comment {
            return None;
        }
        if parent.map_or(false, |parent| line.indent <= parent) {
            return None;
        }
        let mut n = line.skip + 1;
        loop {
            match self.nth(n) {
                None | Some(NEWLINE) => return Some(line.skip),
                Some(STRING | WHITESPACE | COMMENT) => n += 1,
                Some(_) => return None,
            }
        }
    }

    fn parse_block_scalar(&mut self) {
        self.builder.start_node(SCALAR.into());
        self.bump();
        self.skip_inline_trivia();
        while self.current() == Some(NEWLINE) {
            let mut n = 1;
            while matches!(self.nth(n), Some(NEWLINE | INDENT)) {
                n += 1;
            }
            if self.nth(n) != Some(BLOCK_TEXT) {
                break;
            }
            self.bump_n(n + 1);
        }
        self.builder.finish_node();
    }

    fn parse_block_sequence(&mut self, indent: usize) {
        self.builder.start_node(SEQUENCE.into());
        self.parse_sequence_entry(indent);
        while let Some(line) = self.peek_content_line() {
            if line.ends_block(indent) || (line.indent == indent && line.kind != DASH) {
                break;
            }
            self.commit_line(&line);
            if line.indent == indent {
                self.parse_sequence_entry(indent);
            } else {
                self.error_line("unexpected indentation");
            }
        }
        self.builder.finish_node();
    }

    fn parse_sequence_entry(&mut self, indent: usize) {
        self.builder.start_node(SEQUENCE_ENTRY.into());
        self.bump();
        if self.rest_of_line_is_trivia() {
            self.parse_entry_value(indent, false);
        } else {
            if self.current() == Some(WHITESPACE) {
                self.bump();
            }
            self.builder.start_node(VALUE.into());
            let column = self.column();
            match self.current() {
                Some(DASH) => self.parse_block_sequence(column),
                _ if self.is_mapping_key_at(0) => self.parse_block_mapping(column),
                _ => self.parse_inline_value(Some(indent)),
            }
            self.builder.finish_node();
        }
        self.finish_line();
        self.builder.finish_node();
    }

    fn parse_flow_mapping(&mut self) {
        self.builder.start_node(MAPPING.into());
        self.bump();
        loop {
            self.skip_trivia();
            match self.current() {
                Some(RIGHT_BRACE) => {
                    self.bump();
                    break;
                }
                None => {
                    self.error("unclosed flow mapping, expected '}'");
                    break;
                }
                Some(COMMA) => self.error_token("unexpected ','"),
                Some(STRING | SINGLE_QUOTED | DOUBLE_QUOTED) => {
                    self.parse_flow_entry();
                    self.skip_trivia();
                    match self.current() {
                        Some(COMMA) => self.bump(),
                        Some(RIGHT_BRACE) | None => {}
                        Some(_) => self.error_token("expected ',' or '}' in flow mapping"),
                    }
                }
                Some(_) => self.error_token("expected a key in flow mapping"),
            }
        }
        self.builder.finish_node();
    }

    fn parse_flow_entry(&mut self) {
        self.builder.start_node(MAPPING_ENTRY.into());
        self.builder.start_node(KEY.into());
        self.parse_words();
        self.builder.finish_node();
        self.skip_trivia();
        if self.current() == Some(COLON) {
            self.bump();
            self.skip_trivia();
            self.builder.start_node(VALUE.into());
            if !matches!(self.current(), None | Some(COMMA | RIGHT_BRACE)) {
                self.parse_flow_value();
            }
            self.builder.finish_node();
        }
        self.builder.finish_node();
    }

    fn parse_flow_value(&mut self) {
        match self.current() {
            Some(LEFT_BRACE) => self.parse_flow_mapping(),
            Some(LEFT_BRACKET) => self.parse_flow_sequence(),
            Some(ANCHOR | TAG) => {
                self.bump();
                self.skip_trivia();
                if !matches!(
                    self.current(),
                    None | Some(COMMA | RIGHT_BRACE | RIGHT_BRACKET)
                ) {
                    self.parse_flow_value();
                }
            }
            Some(REFERENCE) => {
                self.builder.start_node(SCALAR.into());
                self.bump();
                self.builder.finish_node();
            }
            Some(STRING | SINGLE_QUOTED | DOUBLE_QUOTED) => self.parse_words(),
            Some(UNTERMINATED) => {
                self.error("unterminated quoted scalar");
                self.builder.start_node(SCALAR.into());
                self.bump();
                self.builder.finish_node();
            }
            _ => self.error_token("unexpected token in flow collection"),
        }
    }

    fn parse_flow_sequence(&mut self) {
        self.builder.start_node(SEQUENCE.into());
        self.bump();
        loop {
            self.skip_trivia();
            match self.current() {
                Some(RIGHT_BRACKET) => {
                    self.bump();
                    break;
                }
                None => {
                    self.error("unclosed flow sequence, expected ']'");
                    break;
                }
                Some(COMMA) => self.error_token("unexpected ','"),
                Some(_) => {
                    self.builder.start_node(SEQUENCE_ENTRY.into());
                    self.builder.start_node(VALUE.into());
                    self.parse_flow_value();
                    self.builder.finish_node();
                    self.builder.finish_node();
                    self.skip_trivia();
                    match self.current() {
                        Some(COMMA) => self.bump(),
                        Some(RIGHT_BRACKET) | None => {}
                        Some(_) => self.error_token("expected ',' or ']' in flow sequence"),
                    }
                }
            }
        }
        self.builder.finish_node();
    }
}

/// Parse YAML text
pub(crate) fn parse(text: &str) -> ParsedYaml {
    Parser::new(text).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(text: &str) -> Yaml {
        match Yaml::from_str(text) {
            Ok(yaml) => yaml,
            Err(err) => panic!("failed to parse {:?}: {}", text, err),
        }
    }

    fn root_mapping(text: &str) -> Mapping {
        parse_ok(text)
            .document()
            .and_then(|doc| doc.as_mapping())
            .expect("root mapping")
    }

    fn error_messages(text: &str) -> Vec<String> {
        Yaml::parse(text)
            .errors()
            .iter()
            .map(|err| err.to_string())
            .collect()
    }

    #[test]
    fn test_parse_simple_mapping() {
        let mapping = root_mapping("name: example\nruntime: yaml\n");
        assert_eq!(mapping.keys(), vec!["name", "runtime"]);
        assert!(!mapping.is_flow());
    }

    #[test]
    fn test_lossless_round_trip() {
        let text = "# header\nname: app # trailing\n\nconfig:\n  aws:region: us-west-2\n  db:\n    password:\n      secure: AAABAD==\n";
        assert_eq!(parse_ok(text).to_string(), text);
    }

    #[test]
    fn test_nested_mapping_value() {
        let mapping = root_mapping("config:\n  a: 1\n  b: 2\nother: x\n");
        let config = mapping.entries().next().expect("entry");
        let nested = config.value_mapping().expect("nested mapping");
        assert_eq!(nested.keys(), vec!["a", "b"]);
        assert_eq!(nested.to_string(), "a: 1\n  b: 2");
        assert_eq!(mapping.keys(), vec!["config", "other"]);
    }

    #[test]
    fn test_zero_indented_sequence_value() {
        let mapping = root_mapping("list:\n- a\n- b\nnext: 1\n");
        assert_eq!(mapping.keys(), vec!["list", "next"]);
        let list = mapping.entries().next().and_then(|e| e.value()).expect("value");
        let items: Vec<String> = Sequence::cast(list)
            .expect("sequence")
            .items()
            .filter_map(Scalar::cast)
            .map(|s| s.as_string())
            .collect();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[test]
    fn test_sequence_of_mappings() {
        let text = "- name: a\n  value: 1\n- name: b\n";
        let yaml = parse_ok(text);
        let body = yaml.document().and_then(|d| d.body()).expect("body");
        let items: Vec<Vec<String>> = Sequence::cast(body)
            .expect("sequence")
            .items()
            .filter_map(Mapping::cast)
            .map(|m| m.keys())
            .collect();
        assert_eq!(items, vec![vec!["name", "value"], vec!["name"]]);
    }

    #[test]
    fn test_flow_mapping() {
        let mapping = root_mapping("{foo: bar, \"q k\": 'v'}");
        assert!(mapping.is_flow());
        assert_eq!(mapping.keys(), vec!["foo", "q k"]);
    }

    #[test]
    fn test_flow_mapping_as_value() {
        let mapping = root_mapping("a: {x: 1,\n  y: [1, 2]}\nb: 2\n");
        assert_eq!(mapping.keys(), vec!["a", "b"]);
        let inner = mapping.entries().next().and_then(|e| e.value_mapping()).expect("flow");
        assert_eq!(inner.keys(), vec!["x", "y"]);
    }

    #[test]
    fn test_multi_line_plain_scalar() {
        let mapping = root_mapping("a: one\n  two\n  three\nb: x\n");
        let value = mapping.entries().next().and_then(|e| e.value()).expect("value");
        assert_eq!(Scalar::cast(value).expect("scalar").as_string(), "one two three");
    }

    #[test]
    fn test_block_scalar_value() {
        let mapping = root_mapping("cert: |\n  line one\n  line two\nnext: 1\n");
        assert_eq!(mapping.keys(), vec!["cert", "next"]);
        let value = mapping.entries().next().and_then(|e| e.value()).expect("value");
        assert_eq!(
            Scalar::cast(value).expect("scalar").as_string(),
            "line one\nline two\n"
        );
    }

    #[test]
    fn test_empty_value_is_null() {
        let mapping = root_mapping("a:\nb: 1\n");
        let entry = mapping.entries().next().expect("entry");
        assert!(entry.value().is_none());
        assert_eq!(mapping.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_anchor_and_tag_on_values() {
        let mapping = root_mapping("base: &b\n  x: 1\nother: !!str 5\nref: *b\n");
        assert_eq!(mapping.keys(), vec!["base", "other", "ref"]);
        let base = mapping.entries().next().expect("entry");
        assert_eq!(base.value_mapping().expect("mapping").keys(), vec!["x"]);
    }

    #[test]
    fn test_multiple_documents() {
        let yaml = parse_ok("%YAML 1.2\n---\na: 1\n...\n---\nb: 2\n");
        let keys: Vec<Vec<String>> = yaml
            .documents()
            .filter_map(|d| d.as_mapping())
            .map(|m| m.keys())
            .collect();
        assert_eq!(keys, vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn test_document_without_body() {
        let yaml = parse_ok("# just a comment\n");
        assert!(yaml.document().is_none());
        let yaml = parse_ok("---\n");
        assert!(yaml.document().expect("document").body().is_none());
    }

    #[test]
    fn test_entry_column() {
        assert_eq!(root_mapping("a: 1\n").entry_column(), Some(1));
        let nested = root_mapping("config:\n    a: 1\n")
            .entries()
            .next()
            .and_then(|e| e.value_mapping())
            .expect("nested");
        assert_eq!(nested.entry_column(), Some(5));
    }

    #[test]
    fn test_error_unexpected_indentation() {
        assert_eq!(
            error_messages("a: 1\n  b: 2\n"),
            vec!["2:3: unexpected indentation"]
        );
    }

    #[test]
    fn test_error_mapping_value_on_same_line() {
        assert_eq!(
            error_messages("a: b: c\n"),
            vec!["1:5: mapping values are not allowed on this line"]
        );
    }

    #[test]
    fn test_error_unclosed_flow_mapping() {
        assert_eq!(
            error_messages("a: {x: 1\n"),
            vec!["2:1: unclosed flow mapping, expected '}'"]
        );
    }

    #[test]
    fn test_error_unterminated_quote() {
        assert_eq!(
            error_messages("a: \"open\n"),
            vec!["1:4: unterminated quoted scalar"]
        );
    }

    #[test]
    fn test_error_tab_indentation() {
        assert_eq!(
            error_messages("a:\n\tb: 1\n"),
            vec!["2:2: tab characters are not allowed for indentation"]
        );
    }

    #[test]
    fn test_error_explicit_key() {
        assert_eq!(
            error_messages("? a\n: b\n"),
            vec![
                "1:1: explicit mapping keys are not supported",
                "2:1: unexpected content after the document body"
            ]
        );
    }

    #[test]
    fn test_error_missing_colon() {
        assert_eq!(
            error_messages("a: 1\nb\n"),
            vec!["2:1: expected a mapping key followed by ':'"]
        );
    }

    #[test]
    fn test_tree_is_lossless_with_errors() {
        for text in ["a: b: c\n", "a: {x: 1\n", "? a\n: b\n", "a:\n\tb: 1\n", "]]]"] {
            assert_eq!(Yaml::parse(text).tree().to_string(), text);
        }
    }
}
