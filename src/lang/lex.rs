use super::token::*;
use super::{Column, Error, LineNumber, MaxValue};
use crate::error;

type Result<T> = std::result::Result<T, Error>;

/// Lex one normalized source line into its line number and tokens.
/// Columns index into the normalized text.
pub fn lex(source_line: &str) -> Result<(LineNumber, Vec<(Token, Column)>)> {
    let chars: Vec<char> = source_line.chars().collect();
    let mut pos = 0;
    while pos < chars.len() && is_basic_whitespace(chars[pos]) {
        pos += 1;
    }
    let digits_start = pos;
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }
    let mut line_number: LineNumber = None;
    if pos > digits_start {
        let digits: String = chars[digits_start..pos].iter().collect();
        match digits.parse::<u16>() {
            Ok(num) if num <= LineNumber::max_value() => line_number = Some(num),
            _ => {
                return Err(error!(SyntaxError; "INVALID LINE NUMBER")
                    .at_column(digits_start..pos))
            }
        }
        if chars.get(pos) == Some(&' ') {
            pos += 1;
        }
    }
    let lexer = BasicLexer {
        chars,
        pos,
        remark: false,
        data: false,
    };
    match lexer.run() {
        Ok(tokens) => Ok((line_number, tokens)),
        Err(error) => Err(error.in_line_number(line_number)),
    }
}

fn is_basic_whitespace(c: char) -> bool {
    c == ' ' || c == '\t'
}

struct BasicLexer {
    chars: Vec<char>,
    pos: usize,
    remark: bool,
    data: bool,
}

impl BasicLexer {
    fn run(mut self) -> Result<Vec<(Token, Column)>> {
        let mut tokens: Vec<(Token, Column)> = vec![];
        loop {
            if self.remark {
                let start = self.pos;
                let rest: String = self.chars[self.pos..].iter().collect();
                self.pos = self.chars.len();
                let rest = rest.trim_end();
                if !rest.is_empty() {
                    tokens.push((Token::Remark(rest.to_string()), start..self.pos));
                }
                break;
            }
            while self.peek().map_or(false, is_basic_whitespace) {
                self.pos += 1;
            }
            let c = match self.peek() {
                Some(c) => c,
                None => break,
            };
            let start = self.pos;
            let token = if self.data {
                self.data_item()?
            } else if c.is_ascii_digit() || c == '.' {
                self.number()?
            } else if c.is_ascii_alphabetic() {
                self.word()
            } else if c == '"' {
                self.string()?
            } else {
                self.minutia()?
            };
            match &token {
                Token::Word(Word::Rem) => self.remark = true,
                Token::Word(Word::Data) => self.data = true,
                _ => {}
            }
            tokens.push((token, start..self.pos));
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Inside a DATA statement everything between separators is a
    /// literal: quoted text verbatim, anything else as a trimmed raw
    /// run, numeric-looking runs as numbers.
    fn data_item(&mut self) -> Result<Token> {
        match self.peek() {
            Some(',') => {
                self.pos += 1;
                Ok(Token::Comma)
            }
            Some(':') => {
                self.pos += 1;
                self.data = false;
                Ok(Token::Colon)
            }
            Some('"') => self.string(),
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == ',' || c == ':' {
                        break;
                    }
                    self.pos += 1;
                }
                let raw: String = self.chars[start..self.pos].iter().collect();
                let raw = raw.trim_end();
                if looks_numeric(raw) {
                    if let Ok(n) = raw.parse::<f64>() {
                        return Ok(Token::Literal(Literal::Number(n)));
                    }
                }
                Ok(Token::Literal(Literal::String(raw.to_string())))
            }
        }
    }

    fn number(&mut self) -> Result<Token> {
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let s: String = self.chars[start..self.pos].iter().collect();
        match s.parse::<f64>() {
            Ok(n) => Ok(Token::Literal(Literal::Number(n))),
            Err(_) => Err(error!(SyntaxError; "BAD NUMBER").at_column(start..self.pos)),
        }
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let mut name: String = self.chars[start..self.pos].iter().collect();
        match self.peek() {
            Some('$') => {
                self.pos += 1;
                name.push('$');
                return Token::Ident(Ident::String(name));
            }
            Some('%') => {
                self.pos += 1;
                name.push('%');
                return Token::Ident(Ident::Integer(name));
            }
            _ => {}
        }
        match Token::from_word(&name) {
            Some(token) => token,
            None => Token::Ident(Ident::Plain(name)),
        }
    }

    fn string(&mut self) -> Result<Token> {
        let start = self.pos;
        self.pos += 1;
        let content_start = self.pos;
        while let Some(c) = self.peek() {
            if c == '"' {
                let s: String = self.chars[content_start..self.pos].iter().collect();
                self.pos += 1;
                return Ok(Token::Literal(Literal::String(s)));
            }
            self.pos += 1;
        }
        Err(error!(SyntaxError; "UNTERMINATED STRING").at_column(start..self.pos))
    }

    fn minutia(&mut self) -> Result<Token> {
        let start = self.pos;
        let c = self.chars[self.pos];
        self.pos += 1;
        let token = match c {
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '?' => Token::Word(Word::Print),
            '=' => Token::Operator(Operator::Equal),
            '+' => Token::Operator(Operator::Plus),
            '-' => Token::Operator(Operator::Minus),
            '*' => Token::Operator(Operator::Multiply),
            '/' => Token::Operator(Operator::Divide),
            '^' => Token::Operator(Operator::Caret),
            '<' => match self.peek() {
                Some('=') => {
                    self.pos += 1;
                    Token::Operator(Operator::LessEqual)
                }
                Some('>') => {
                    self.pos += 1;
                    Token::Operator(Operator::NotEqual)
                }
                _ => Token::Operator(Operator::Less),
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.pos += 1;
                    Token::Operator(Operator::GreaterEqual)
                }
                _ => Token::Operator(Operator::Greater),
            },
            _ => {
                return Err(
                    error!(SyntaxError; "UNEXPECTED CHARACTER").at_column(start..self.pos)
                )
            }
        };
        Ok(token)
    }
}

fn looks_numeric(s: &str) -> bool {
    let digits = s
        .strip_prefix('-')
        .or_else(|| s.strip_prefix('+'))
        .unwrap_or(s);
    !digits.is_empty()
        && digits.chars().filter(|c| *c == '.').count() <= 1
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().any(|c| c.is_ascii_digit())
}
