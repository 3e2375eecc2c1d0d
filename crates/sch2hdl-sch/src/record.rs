//! Record scanner for xschem-style schematic text.
//!
//! A schematic is a flat sequence of records. A record starts with a short tag
//! (`C`, `T`, `N`, `v`, ...) and runs until the end of its line, except that
//! brace-delimited fields may span lines:
//!
//! ```text
//! C {res.sym} 170 -130 0 0 {name=R1
//! value=1k}
//! ```
//!
//! Inside a brace field a backslash escapes the next character and unescaped
//! nested braces are balanced. The scanner never fails: an unterminated field
//! ends before the next line that starts a record (or at the end of the
//! input) and missing fields are simply absent.

/// Tags of the record types a schematic may contain.
const RECORD_TAGS: &str = "vGKVSEFLBPANTC";

/// One field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// A bare whitespace-delimited word
    Word(String),
    /// Raw text between a pair of braces, escapes left untouched
    Braced(String),
}

impl Field {
    pub fn as_braced(&self) -> Option<&str> {
        match self {
            Field::Braced(s) => Some(s),
            Field::Word(_) => None,
        }
    }
}

/// A single schematic record: its tag and the fields following it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Leading tag, empty if the record started with a brace field
    pub tag: String,
    pub fields: Vec<Field>,
}

impl Record {
    /// Text of the brace field at `index`, or `""` when it is missing or bare.
    pub fn braced(&self, index: usize) -> &str {
        self.fields
            .get(index)
            .and_then(Field::as_braced)
            .unwrap_or_default()
    }
}

/// Streaming scanner yielding [`Record`]s.
pub struct Scanner<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner {
            input,
            chars: input.char_indices().peekable(),
            current_pos: 0,
        }
    }

    /// Scan the next record, or `None` at end of input.
    pub fn next_record(&mut self) -> Option<Record> {
        self.skip_whitespace();
        if self.is_at_end() {
            return None;
        }

        let mut fields = Vec::new();
        loop {
            self.skip_inline_whitespace();
            match self.peek_char() {
                None => break,
                Some('\n') => {
                    self.advance();
                    break;
                }
                Some('{') => fields.push(Field::Braced(self.scan_braced())),
                Some(_) => fields.push(Field::Word(self.scan_word())),
            }
        }

        let tag = match fields.first() {
            Some(Field::Word(word)) => {
                let tag = word.clone();
                fields.remove(0);
                tag
            }
            _ => String::new(),
        };

        Some(Record { tag, fields })
    }

    fn scan_braced(&mut self) -> String {
        let open = self.current_pos;
        self.advance(); // '{'
        let input = self.input;
        let rest = &input[self.current_pos..];

        let (body, resume) = match closing_brace(rest) {
            Some(close) => (&rest[..close], close + 1),
            None => {
                // Resume at the newline before the next record line.
                let newline = recovery_point(rest).unwrap_or(rest.len());
                log::warn!(
                    "Unterminated brace field at byte {open}, resuming at byte {}",
                    self.current_pos + newline
                );
                (&rest[..newline], newline)
            }
        };

        let body = body.to_string();
        let target = self.current_pos + resume;
        while self.current_pos < target && !self.is_at_end() {
            self.advance();
        }
        body
    }

    fn scan_word(&mut self) -> String {
        let start = self.current_pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == '{' {
                break;
            }
            self.advance();
        }
        self.input[start..self.current_pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' || !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos + ch.len_utf8();
        }
    }

    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }
}

/// Offset of the `}` closing a field whose body starts `text`.
fn closing_brace(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut chars = text.char_indices();
    while let Some((pos, ch)) = chars.next() {
        match ch {
            '\\' => {
                chars.next();
            }
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
            }
            _ => {}
        }
    }
    None
}

/// Offset of the first newline followed by a line that starts a record.
fn recovery_point(text: &str) -> Option<usize> {
    text.match_indices('\n')
        .map(|(pos, _)| pos)
        .find(|&pos| starts_record(&text[pos + 1..]))
}

fn starts_record(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(tag), Some(' ' | '\t')) if RECORD_TAGS.contains(tag)
    )
}

impl Iterator for Scanner<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.next_record()
    }
}

/// Scan every record in `input`.
pub fn scan(input: &str) -> Vec<Record> {
    let records: Vec<Record> = Scanner::new(input).collect();
    log::trace!(
        "Scanned {} records from {} bytes of input",
        records.len(),
        input.len()
    );
    records
}
