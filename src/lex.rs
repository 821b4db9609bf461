//! Lexer for YAML configuration files.
//!
//! The lexer is context sensitive in the places YAML needs it to be: a `:`
//! only separates a key from its value when followed by whitespace, `#` only
//! starts a comment after whitespace, and the lines following a `|` or `>`
//! header are handed out as raw block text. Everything the lexer sees ends up
//! in exactly one token, so concatenating the token texts reproduces the input.

/// Lexical analysis: the variants are different kinds of "tokens".
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // Structural
    /// Root node of the syntax tree
    ROOT = 0,
    /// A YAML document
    DOCUMENT,
    /// A YAML mapping (key-value pairs)
    MAPPING,
    /// A single `key: value` pair inside a mapping
    MAPPING_ENTRY,
    /// The key half of a mapping entry
    KEY,
    /// The value half of a mapping entry or sequence entry
    VALUE,
    /// A YAML sequence (list)
    SEQUENCE,
    /// A single item of a sequence
    SEQUENCE_ENTRY,
    /// A YAML scalar value
    SCALAR,
    /// Parse error marker
    ERROR,

    // Indicators
    /// Dash character '-' introducing a block sequence entry
    DASH,
    /// Colon character ':' separating a key from its value
    COLON,
    /// Question mark '?' introducing an explicit key
    QUESTION,
    /// Comma ','
    COMMA,
    /// Left bracket '['
    LEFT_BRACKET,
    /// Right bracket ']'
    RIGHT_BRACKET,
    /// Left brace '{'
    LEFT_BRACE,
    /// Right brace '}'
    RIGHT_BRACE,
    /// Literal block scalar header, '|' plus any chomping and indentation indicators
    PIPE,
    /// Folded block scalar header, '>' plus any chomping and indentation indicators
    GREATER,

    // Node properties
    /// YAML anchor like '&anchor'
    ANCHOR,
    /// YAML reference like '*reference'
    REFERENCE,
    /// YAML tag like '!tag'
    TAG,

    // Document markers
    /// Document start marker '---'
    DOC_START,
    /// Document end marker '...'
    DOC_END,
    /// YAML directive like '%YAML 1.2'
    DIRECTIVE,

    // Content
    /// A run of plain (unquoted) scalar text
    STRING,
    /// Single quoted scalar, quotes included
    SINGLE_QUOTED,
    /// Double quoted scalar, quotes included
    DOUBLE_QUOTED,
    /// Quoted scalar missing its closing quote
    UNTERMINATED,
    /// One content line of a block scalar, without its indentation
    BLOCK_TEXT,

    // Whitespace and formatting
    /// Spaces and tabs
    WHITESPACE,
    /// Newline characters
    NEWLINE,
    /// Leading whitespace that determines structure
    INDENT,
    /// Comments starting with '#'
    COMMENT,
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

impl SyntaxKind {
    /// Whether this kind is whitespace, a line break or a comment.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::INDENT | SyntaxKind::COMMENT
        )
    }

    /// Whether this kind can start a scalar key or value.
    pub fn is_scalar_text(self) -> bool {
        matches!(
            self,
            SyntaxKind::STRING | SyntaxKind::SINGLE_QUOTED | SyntaxKind::DOUBLE_QUOTED
        )
    }
}

fn is_blank(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_flow_indicator(byte: u8) -> bool {
    matches!(byte, b',' | b'[' | b']' | b'{' | b'}')
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<(SyntaxKind, &'a str)>,
    flow_depth: usize,
    /// Indentation (in spaces) of the line being lexed.
    line_indent: usize,
    at_line_start: bool,
    /// Inside a plain scalar, where indicators are ordinary text.
    in_plain: bool,
    /// Indentation of the line owning a block scalar header seen on this line.
    pending_block: Option<usize>,
    /// Indentation of the line owning the block scalar being lexed.
    block_parent: Option<usize>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            flow_depth: 0,
            line_indent: 0,
            at_line_start: true,
            in_plain: false,
            pending_block: None,
            block_parent: None,
        }
    }

    fn run(mut self) -> Vec<(SyntaxKind, &'a str)> {
        while self.pos < self.bytes.len() {
            if self.at_line_start {
                self.at_line_start = false;
                self.lex_line_start();
                continue;
            }
            self.lex_token();
        }
        self.tokens
    }

    fn push(&mut self, kind: SyntaxKind, end: usize) {
        self.tokens.push((kind, &self.input[self.pos..end]));
        self.pos = end;
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn line_end(&self, from: usize) -> usize {
        self.bytes[from..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .map_or(self.bytes.len(), |i| from + i)
    }

    fn count_while(&self, from: usize, pred: impl Fn(u8) -> bool) -> usize {
        self.bytes[from..].iter().take_while(|&&b| pred(b)).count()
    }

    fn lex_line_start(&mut self) {
        let spaces = self.count_while(self.pos, |b| b == b' ');
        let leading = self.count_while(self.pos, |b| b == b' ' || b == b'\t');
        let line_end = self.line_end(self.pos);
        let blank = self.pos + leading == line_end;

        if let Some(parent) = self.block_parent {
            if blank {
                if leading > 0 {
                    self.push(SyntaxKind::INDENT, self.pos + leading);
                }
                return;
            }
            if spaces > parent {
                if spaces > 0 {
                    self.push(SyntaxKind::INDENT, self.pos + spaces);
                }
                self.push(SyntaxKind::BLOCK_TEXT, line_end);
                return;
            }
            self.block_parent = None;
        }

        self.line_indent = spaces;
        if leading > 0 {
            self.push(SyntaxKind::INDENT, self.pos + leading);
            return;
        }

        if self.flow_depth > 0 {
            return;
        }
        let rest = &self.bytes[self.pos..];
        let marker_end = rest.get(3).map_or(true, |&b| is_blank(b));
        if rest.starts_with(b"---") && marker_end {
            self.push(SyntaxKind::DOC_START, self.pos + 3);
        } else if rest.starts_with(b"...") && marker_end {
            self.push(SyntaxKind::DOC_END, self.pos + 3);
        } else if rest.first() == Some(&b'%') {
            self.push(SyntaxKind::DIRECTIVE, line_end);
        }
    }

    fn lex_token(&mut self) {
        match self.bytes[self.pos] {
            b'\n' => {
                self.push(SyntaxKind::NEWLINE, self.pos + 1);
                self.start_new_line();
            }
            b'\r' => {
                let len = if self.peek(1) == Some(b'\n') { 2 } else { 1 };
                self.push(SyntaxKind::NEWLINE, self.pos + len);
                self.start_new_line();
            }
            b' ' | b'\t' => {
                let len = self.count_while(self.pos, |b| b == b' ' || b == b'\t');
                self.push(SyntaxKind::WHITESPACE, self.pos + len);
            }
            b'#' if self.comment_allowed() => {
                let end = self.line_end(self.pos);
                self.push(SyntaxKind::COMMENT, end);
                self.in_plain = false;
            }
            _ => self.lex_content(),
        }
    }

    fn start_new_line(&mut self) {
        self.at_line_start = true;
        self.in_plain = false;
        self.line_indent = 0;
        if let Some(indent) = self.pending_block.take() {
            self.block_parent = Some(indent);
        }
    }

    fn comment_allowed(&self) -> bool {
        self.pos == 0 || is_blank(self.bytes[self.pos - 1])
    }

    fn lex_content(&mut self) {
        let byte = self.bytes[self.pos];
        let next = self.peek(1);
        let next_is_blank = next.map_or(true, is_blank);
        let in_flow = self.flow_depth > 0;
        let start = self.pos;

        match byte {
            b':' if next_is_blank || (in_flow && next.map_or(false, is_flow_indicator)) => {
                self.push(SyntaxKind::COLON, start + 1);
                self.in_plain = false;
            }
            b'-' if !in_flow && !self.in_plain && next_is_blank => {
                self.push(SyntaxKind::DASH, start + 1);
            }
            b'?' if !in_flow && !self.in_plain && next_is_blank => {
                self.push(SyntaxKind::QUESTION, start + 1);
            }
            b',' if in_flow => {
                self.push(SyntaxKind::COMMA, start + 1);
                self.in_plain = false;
            }
            b'{' | b'[' if in_flow || !self.in_plain => {
                let kind = if byte == b'{' {
                    SyntaxKind::LEFT_BRACE
                } else {
                    SyntaxKind::LEFT_BRACKET
                };
                self.push(kind, start + 1);
                self.flow_depth += 1;
                self.in_plain = false;
            }
            b'}' | b']' if in_flow => {
                let kind = if byte == b'}' {
                    SyntaxKind::RIGHT_BRACE
                } else {
                    SyntaxKind::RIGHT_BRACKET
                };
                self.push(kind, start + 1);
                self.flow_depth -= 1;
                self.in_plain = false;
            }
            b'"' if !self.in_plain => self.lex_double_quoted(),
            b'\'' if !self.in_plain => self.lex_single_quoted(),
            b'&' | b'*' | b'!' if !self.in_plain => {
                let kind = match byte {
                    b'&' => SyntaxKind::ANCHOR,
                    b'*' => SyntaxKind::REFERENCE,
                    _ => SyntaxKind::TAG,
                };
                let len = 1 + self.count_while(start + 1, |b| {
                    !is_blank(b) && !(in_flow && is_flow_indicator(b))
                });
                self.push(kind, start + len);
            }
            b'|' | b'>' if !in_flow && !self.in_plain => {
                let kind = if byte == b'|' {
                    SyntaxKind::PIPE
                } else {
                    SyntaxKind::GREATER
                };
                let len = 1 + self.count_while(start + 1, |b| {
                    b == b'+' || b == b'-' || b.is_ascii_digit()
                });
                self.push(kind, start + len);
                self.pending_block = Some(self.line_indent);
            }
            _ => self.lex_plain(),
        }
    }

    fn lex_plain(&mut self) {
        let in_flow = self.flow_depth > 0;
        let mut end = self.pos;
        while let Some(&byte) = self.bytes.get(end) {
            if is_blank(byte) || (in_flow && is_flow_indicator(byte)) {
                break;
            }
            if byte == b':' {
                let next = self.bytes.get(end + 1).copied();
                if next.map_or(true, is_blank) || (in_flow && next.map_or(false, is_flow_indicator)) {
                    break;
                }
            }
            end += 1;
        }
        if end == self.pos {
            // A lone indicator that means nothing here.
            end += self.input[self.pos..].chars().next().map_or(1, char::len_utf8);
        }
        self.push(SyntaxKind::STRING, end);
        self.in_plain = true;
    }

    fn lex_double_quoted(&mut self) {
        let mut end = self.pos + 1;
        while let Some(&byte) = self.bytes.get(end) {
            match byte {
                b'\\' => end += 2,
                b'"' => {
                    self.push(SyntaxKind::DOUBLE_QUOTED, end + 1);
                    return;
                }
                _ => end += 1,
            }
        }
        self.push(SyntaxKind::UNTERMINATED, self.bytes.len());
    }

    fn lex_single_quoted(&mut self) {
        let mut end = self.pos + 1;
        while let Some(&byte) = self.bytes.get(end) {
            if byte == b'\'' {
                if self.bytes.get(end + 1) == Some(&b'\'') {
                    end += 2;
                    continue;
                }
                self.push(SyntaxKind::SINGLE_QUOTED, end + 1);
                return;
            }
            end += 1;
        }
        self.push(SyntaxKind::UNTERMINATED, self.bytes.len());
    }
}

/// Split the input into tokens.
///
/// The returned tokens cover the input without gaps or overlap.
pub fn lex(input: &str) -> Vec<(SyntaxKind, &str)> {
    Lexer::new(input).run()
}
