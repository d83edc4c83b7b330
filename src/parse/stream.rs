use crate::parse::SyntaxError;
use ustr::Ustr;

#[derive(Debug)]
pub struct Stream<'a> {
    text: &'a str,
    pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint(usize);

impl<'a> Stream<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint(self.pos)
    }

    pub fn rewind(&mut self, to: Checkpoint) {
        self.pos = to.0;
    }

    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Consumes the first spelling that matches at the current position.
    /// Word-like spellings must not run into an identifier.
    pub fn eat_any(&mut self, spellings: &[&str]) -> bool {
        self.skip_whitespace();
        let rest = self.rest();

        for spelling in spellings {
            let Some(after) = rest.strip_prefix(spelling) else {
                continue;
            };

            let word_like = spelling.ends_with(is_ident_char);
            if word_like && after.starts_with(is_ident_char) {
                continue;
            }

            self.pos += spelling.len();
            return true;
        }

        false
    }

    pub fn eat(&mut self, spelling: &str) -> bool {
        self.eat_any(&[spelling])
    }

    /// Checks for a spelling without consuming it.
    pub fn at_any(&mut self, spellings: &[&str]) -> bool {
        let check = self.checkpoint();
        let found = self.eat_any(spellings);
        self.rewind(check);
        found
    }

    pub fn ident(&mut self) -> Option<Ustr> {
        self.skip_whitespace();
        let rest = self.rest();

        if !rest.starts_with(is_ident_start) {
            return None;
        }

        let len = rest.find(|c| !is_ident_char(c)).unwrap_or(rest.len());
        self.pos += len;
        Some(Ustr::from(&rest[..len]))
    }

    pub fn expect(&mut self, spelling: &'static str) -> Result<(), SyntaxError> {
        if self.eat(spelling) {
            Ok(())
        } else {
            Err(self.error(spelling))
        }
    }

    pub fn expect_eof(&mut self, expected: &'static str) -> Result<(), SyntaxError> {
        self.skip_whitespace();
        if self.pos >= self.text.len() {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    /// An error at the next token, which is described by its first character.
    pub fn error(&mut self, expected: &'static str) -> SyntaxError {
        self.skip_whitespace();
        SyntaxError::new(self.pos, expected, self.peek())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
