//! # 词法分析器
//!
//! 将输入文本转换为惰性的 token 序列，以 `Eof` token 结尾。
//!
//! [`Lexer`] 实现了 `Iterator` 和 `Clone`：克隆一份即可从当前位置重新开始遍历。
//! 遇到错误或产出 `Eof` 之后迭代结束。

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::trace;

use crate::error::LexError;
use crate::syntax::ast::BinaryOperator;
use crate::syntax::token::{Token, TokenKind};
use crate::value::Value;

/// 词法分析器
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            finished: false,
        }
    }

    /// 一次性收集全部 token（包含结尾的 `Eof`）
    pub fn tokenize(input: &'a str) -> Result<Vec<Token>, LexError> {
        Lexer::new(input).collect()
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.remaining().chars().nth(1)
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    /// 消费满足条件的连续字符，返回对应片段
    fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if pred(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.pos;

        let Some(c) = self.peek_char() else {
            return Ok(Token::eof(start));
        };

        match c {
            '0'..='9' => self.lex_number(start),
            '"' => self.lex_string(start),
            c if c.is_alphabetic() || c == '_' => Ok(self.lex_word(start)),
            '(' => Ok(self.single(TokenKind::LParen, start)),
            ')' => Ok(self.single(TokenKind::RParen, start)),
            '=' => Ok(self.single(TokenKind::Assign, start)),
            '+' => Ok(self.single(TokenKind::Operator(BinaryOperator::Add), start)),
            '-' => Ok(self.single(TokenKind::Operator(BinaryOperator::Subtract), start)),
            '*' => Ok(self.single(TokenKind::Operator(BinaryOperator::Multiply), start)),
            '/' => Ok(self.single(TokenKind::Operator(BinaryOperator::Divide), start)),
            '&' if self.peek_second() == Some('&') => {
                Ok(self.double(TokenKind::Operator(BinaryOperator::And), start))
            }
            '|' if self.peek_second() == Some('|') => {
                Ok(self.double(TokenKind::Operator(BinaryOperator::Or), start))
            }
            other => Err(LexError::UnexpectedCharacter {
                ch: other,
                position: start,
            }),
        }
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        self.consume_char();
        Token::new(kind, &self.input[start..self.pos], start)
    }

    fn double(&mut self, kind: TokenKind, start: usize) -> Token {
        self.consume_char();
        self.consume_char();
        Token::new(kind, &self.input[start..self.pos], start)
    }

    /// 数字：无小数点为 Integer，恰好一个小数点为 Decimal
    fn lex_number(&mut self, start: usize) -> Result<Token, LexError> {
        let lexeme = self.consume_while(|c| c.is_ascii_digit() || c == '.');
        let malformed = || LexError::MalformedNumber {
            lexeme: lexeme.to_string(),
            position: start,
        };

        let value = match lexeme.matches('.').count() {
            0 => Value::Integer(lexeme.parse::<i64>().map_err(|_| malformed())?),
            1 if !lexeme.ends_with('.') => {
                Value::Decimal(Decimal::from_str(lexeme).map_err(|_| malformed())?)
            }
            _ => return Err(malformed()),
        };

        Ok(Token::literal(TokenKind::Number, lexeme, start, value))
    }

    /// 字符串：不支持转义，遇到下一个 `"` 即结束
    fn lex_string(&mut self, start: usize) -> Result<Token, LexError> {
        self.consume_char();
        let content = self.consume_while(|c| c != '"');
        if self.consume_char().is_none() {
            return Err(LexError::UnterminatedString { position: start });
        }
        Ok(Token::literal(
            TokenKind::String,
            &self.input[start..self.pos],
            start,
            Value::String(content.to_string()),
        ))
    }

    /// 关键字 `true` / `false` 或标识符
    fn lex_word(&mut self, start: usize) -> Token {
        let word = self.consume_while(|c| c.is_alphanumeric() || c == '_');
        match word {
            "true" => Token::literal(TokenKind::Boolean, word, start, Value::Boolean(true)),
            "false" => Token::literal(TokenKind::Boolean, word, start, Value::Boolean(false)),
            _ => Token::new(TokenKind::Identifier, word, start),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let result = self.next_token();
        match &result {
            Ok(token) => {
                trace!(token = %token, "lexed");
                if token.is_eof() {
                    self.finished = true;
                }
            }
            Err(_) => self.finished = true,
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}
