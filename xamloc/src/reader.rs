//! Position-tracking markup tokenizer and namespace scoping.
//!
//! The scanner and the rewriter must agree on (line, column) character
//! positions down to the exact character, so the tokenizer is hand-rolled on
//! top of a char cursor rather than delegating to a general XML library that
//! hides positions. It understands exactly the subset of XML the rewriter can
//! edit: start tags with quoted attributes, end tags, text with character
//! entities; comments, processing instructions, DOCTYPE, and CDATA sections
//! are skipped.

use std::{iter::Peekable, str::Chars};

use crate::{error::Error, uid::Position};

/// The xaml-x namespace, home of the `Uid` and `Name` directive attributes.
pub const XAML_NS_X: &str = "http://schemas.microsoft.com/winfx/2006/xaml";
/// The default presentation namespace.
pub const XAML_NS_DEFAULT: &str = "http://schemas.microsoft.com/winfx/2006/xaml/presentation";

/// Splits a qualified name into (prefix, local part) at the first `:`.
/// Unprefixed names get an empty prefix.
pub fn split_qualified(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeToken {
    /// Qualified name as written (`x:Uid`, `Content`, `xmlns:local`).
    pub name: String,
    /// Entity-decoded value.
    pub value: String,
    /// Start of the attribute name.
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTagToken {
    /// Qualified tag name as written.
    pub name: String,
    /// Start of the tag name (after `<`).
    pub position: Position,
    /// Position right after the last character of the tag name.
    pub name_end: Position,
    pub attributes: Vec<AttributeToken>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartTag(StartTagToken),
    EndTag { name: String, position: Position },
    /// A run of character data containing at least one non-whitespace
    /// character. Entity-decoded; not trimmed.
    Text { text: String, position: Position },
}

/// Char cursor over the source with 1-based line/column tracking. `\n` ends a
/// line; every other character (including `\r`) advances the column by one.
/// The rewriter walks the source with the same cursor, which keeps edit
/// positions in sync.
pub(crate) struct Cursor<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        // A leading byte-order mark is an encoding artifact, not content; it
        // occupies no position.
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Cursor {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub(crate) fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    pub(crate) fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

pub struct MarkupReader<'a> {
    cursor: Cursor<'a>,
}

impl<'a> MarkupReader<'a> {
    pub fn new(source: &'a str) -> Self {
        MarkupReader {
            cursor: Cursor::new(source),
        }
    }

    /// Pulls the next structural token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, Error> {
        loop {
            let text_position = self.cursor.position();
            let mut text = String::new();
            while let Some(ch) = self.cursor.peek() {
                if ch == '<' {
                    break;
                }
                if ch == '&' {
                    text.push(self.read_entity()?);
                } else {
                    self.cursor.bump();
                    text.push(ch);
                }
            }
            if text.chars().any(|c| !c.is_whitespace()) {
                return Ok(Some(Token::Text {
                    text,
                    position: text_position,
                }));
            }

            if self.cursor.peek().is_none() {
                return Ok(None);
            }
            let open_position = self.cursor.position();
            self.cursor.bump(); // '<'
            match self.cursor.peek() {
                Some('!') => self.skip_declaration(open_position)?,
                Some('?') => self.skip_processing_instruction(open_position)?,
                Some('/') => {
                    self.cursor.bump();
                    return Ok(Some(self.read_end_tag(open_position)?));
                }
                Some(_) => return Ok(Some(Token::StartTag(self.read_start_tag(open_position)?))),
                None => {
                    return Err(Error::markup(
                        "unexpected end of file after `<`",
                        open_position.line,
                        open_position.column,
                    ));
                }
            }
        }
    }

    fn read_start_tag(&mut self, open_position: Position) -> Result<StartTagToken, Error> {
        let position = self.cursor.position();
        let name = self.read_name();
        if name.is_empty() {
            return Err(Error::markup(
                "expected a tag name after `<`",
                open_position.line,
                open_position.column,
            ));
        }
        let name_end = self.cursor.position();

        let mut attributes = Vec::new();
        loop {
            self.skip_whitespace();
            match self.cursor.peek() {
                Some('>') => {
                    self.cursor.bump();
                    return Ok(StartTagToken {
                        name,
                        position,
                        name_end,
                        attributes,
                        self_closing: false,
                    });
                }
                Some('/') => {
                    self.cursor.bump();
                    if self.cursor.peek() != Some('>') {
                        let at = self.cursor.position();
                        return Err(Error::markup("expected `>` after `/`", at.line, at.column));
                    }
                    self.cursor.bump();
                    return Ok(StartTagToken {
                        name,
                        position,
                        name_end,
                        attributes,
                        self_closing: true,
                    });
                }
                Some(_) => attributes.push(self.read_attribute()?),
                None => {
                    return Err(Error::markup(
                        format!("unterminated start tag `{name}`"),
                        open_position.line,
                        open_position.column,
                    ));
                }
            }
        }
    }

    fn read_attribute(&mut self) -> Result<AttributeToken, Error> {
        let position = self.cursor.position();
        let name = self.read_name();
        if name.is_empty() {
            return Err(Error::markup(
                "expected an attribute name",
                position.line,
                position.column,
            ));
        }
        self.skip_whitespace();
        if self.cursor.peek() != Some('=') {
            let at = self.cursor.position();
            return Err(Error::markup(
                format!("expected `=` after attribute `{name}`"),
                at.line,
                at.column,
            ));
        }
        self.cursor.bump();
        self.skip_whitespace();
        let quote = match self.cursor.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                let at = self.cursor.position();
                return Err(Error::markup(
                    format!("expected a quoted value for attribute `{name}`"),
                    at.line,
                    at.column,
                ));
            }
        };
        self.cursor.bump();
        let mut value = String::new();
        loop {
            match self.cursor.peek() {
                Some(ch) if ch == quote => {
                    self.cursor.bump();
                    break;
                }
                Some('&') => value.push(self.read_entity()?),
                Some(ch) => {
                    self.cursor.bump();
                    value.push(ch);
                }
                None => {
                    return Err(Error::markup(
                        format!("unterminated value for attribute `{name}`"),
                        position.line,
                        position.column,
                    ));
                }
            }
        }
        Ok(AttributeToken {
            name,
            value,
            position,
        })
    }

    fn read_end_tag(&mut self, open_position: Position) -> Result<Token, Error> {
        let name = self.read_name();
        if name.is_empty() {
            return Err(Error::markup(
                "expected a tag name after `</`",
                open_position.line,
                open_position.column,
            ));
        }
        self.skip_whitespace();
        if self.cursor.peek() != Some('>') {
            let at = self.cursor.position();
            return Err(Error::markup(
                format!("expected `>` to close `</{name}`"),
                at.line,
                at.column,
            ));
        }
        self.cursor.bump();
        Ok(Token::EndTag {
            name,
            position: open_position,
        })
    }

    /// Skips `<!-- -->`, `<![CDATA[ ]]>`, and `<!DOCTYPE >`; the cursor sits
    /// just after `<` on entry.
    fn skip_declaration(&mut self, open_position: Position) -> Result<(), Error> {
        self.cursor.bump(); // '!'
        if self.cursor.peek() == Some('-') {
            self.cursor.bump();
            if self.cursor.peek() != Some('-') {
                return Err(Error::markup(
                    "malformed comment",
                    open_position.line,
                    open_position.column,
                ));
            }
            self.cursor.bump();
            self.skip_until("-->", "unterminated comment", open_position)
        } else if self.cursor.peek() == Some('[') {
            for expected in "[CDATA[".chars() {
                if self.cursor.peek() != Some(expected) {
                    return Err(Error::markup(
                        "malformed CDATA section",
                        open_position.line,
                        open_position.column,
                    ));
                }
                self.cursor.bump();
            }
            self.skip_until("]]>", "unterminated CDATA section", open_position)
        } else {
            // DOCTYPE and friends.
            loop {
                match self.cursor.bump() {
                    Some('>') => return Ok(()),
                    Some(_) => {}
                    None => {
                        return Err(Error::markup(
                            "unterminated declaration",
                            open_position.line,
                            open_position.column,
                        ));
                    }
                }
            }
        }
    }

    fn skip_processing_instruction(&mut self, open_position: Position) -> Result<(), Error> {
        self.cursor.bump(); // '?'
        self.skip_until("?>", "unterminated processing instruction", open_position)
    }

    fn skip_until(
        &mut self,
        terminator: &str,
        message: &str,
        open_position: Position,
    ) -> Result<(), Error> {
        let terminator: Vec<char> = terminator.chars().collect();
        let mut window: Vec<char> = Vec::with_capacity(terminator.len());
        loop {
            match self.cursor.bump() {
                Some(ch) => {
                    if window.len() == terminator.len() {
                        window.remove(0);
                    }
                    window.push(ch);
                    if window == terminator {
                        return Ok(());
                    }
                }
                None => {
                    return Err(Error::markup(
                        message,
                        open_position.line,
                        open_position.column,
                    ));
                }
            }
        }
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.cursor.peek() {
            if ch.is_whitespace() || matches!(ch, '>' | '/' | '=') {
                break;
            }
            self.cursor.bump();
            name.push(ch);
        }
        name
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.cursor.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.cursor.bump();
        }
    }

    fn read_entity(&mut self) -> Result<char, Error> {
        let position = self.cursor.position();
        self.cursor.bump(); // '&'
        let mut entity = String::new();
        loop {
            match self.cursor.bump() {
                Some(';') => break,
                Some(ch) if entity.len() < 10 => entity.push(ch),
                _ => {
                    return Err(Error::markup(
                        "unterminated character entity",
                        position.line,
                        position.column,
                    ));
                }
            }
        }
        let decoded = match entity.as_str() {
            "lt" => '<',
            "gt" => '>',
            "amp" => '&',
            "quot" => '"',
            "apos" => '\'',
            numeric => {
                let code = if let Some(hex) = numeric.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = numeric.strip_prefix('#') {
                    dec.parse().ok()
                } else {
                    None
                };
                match code.and_then(char::from_u32) {
                    Some(ch) => ch,
                    None => {
                        return Err(Error::markup(
                            format!("unknown character entity `&{entity};`"),
                            position.line,
                            position.column,
                        ));
                    }
                }
            }
        };
        Ok(decoded)
    }
}

/// Lexically scoped namespace bindings, pushed and popped per element.
#[derive(Debug, Default)]
pub struct Namespaces {
    scopes: Vec<Vec<(String, String)>>,
}

impl Namespaces {
    pub fn new() -> Self {
        Namespaces::default()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Binds `prefix` (empty for the default namespace) in the current scope.
    pub fn declare(&mut self, prefix: &str, uri: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push((prefix.to_string(), uri.to_string()));
        }
    }

    /// Resolves a prefix to its URI, innermost binding first.
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        for scope in self.scopes.iter().rev() {
            for (bound_prefix, uri) in scope.iter().rev() {
                if bound_prefix == prefix {
                    return Some(uri);
                }
            }
        }
        None
    }

    /// Finds a non-default prefix currently bound to `uri`, skipping prefixes
    /// shadowed by an inner rebinding.
    pub fn prefix_of(&self, uri: &str) -> Option<&str> {
        for scope in self.scopes.iter().rev() {
            for (prefix, bound_uri) in scope.iter().rev() {
                if !prefix.is_empty() && bound_uri == uri && self.lookup(prefix) == Some(uri) {
                    return Some(prefix);
                }
            }
        }
        None
    }
}
