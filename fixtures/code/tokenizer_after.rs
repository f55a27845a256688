use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(i64),
    Ident(String),
    Plus,
    Minus,
    Star,
}

pub struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    position: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.position += 1;
        Some(c)
    }

    fn number(&mut self, first: char) -> Token {
        let mut value = first.to_digit(10).unwrap_or(0) as i64;
        while let Some(d) = self.chars.peek().and_then(|c| c.to_digit(10)) {
            value = value * 10 + d as i64;
            self.bump();
        }
        Token::Number(value)
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let c = self.bump()?;
        match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            c if c.is_ascii_digit() => Some(self.number(c)),
            c if c.is_whitespace() => self.next(),
            c => Some(Token::Ident(c.to_string())),
        }
    }
}
