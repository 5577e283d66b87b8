//! # Token 模块
//!
//! 词法单元定义。Token 产生后不可变。

use std::fmt;

use crate::syntax::ast::BinaryOperator;
use crate::value::Value;

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// 数字字面量（整数或小数）
    Number,
    /// 字符串字面量
    String,
    /// 布尔字面量 `true` / `false`
    Boolean,
    /// 标识符
    Identifier,
    /// 运算符 `+ - * / && ||`
    ///
    /// `-` 统一记为 [`BinaryOperator::Subtract`]，由解析器决定是否为一元取负
    Operator(BinaryOperator),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `=`
    Assign,
    /// 输入结束
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number => f.write_str("Number"),
            TokenKind::String => f.write_str("String"),
            TokenKind::Boolean => f.write_str("Boolean"),
            TokenKind::Identifier => f.write_str("Identifier"),
            TokenKind::Operator(op) => write!(f, "Operator({})", op),
            TokenKind::LParen => f.write_str("LParen"),
            TokenKind::RParen => f.write_str("RParen"),
            TokenKind::Assign => f.write_str("Assign"),
            TokenKind::Eof => f.write_str("EOF"),
        }
    }
}

/// 词法单元
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 源码片段（字符串字面量包含两侧引号）
    pub lexeme: String,
    /// 在输入中的字节偏移
    pub position: usize,
    /// 字面量 token 携带的值，类型由字面形式决定
    pub literal: Option<Value>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
            literal: None,
        }
    }

    /// 创建携带字面量值的 token
    pub fn literal(
        kind: TokenKind,
        lexeme: impl Into<String>,
        position: usize,
        value: Value,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
            literal: Some(value),
        }
    }

    pub fn eof(position: usize) -> Self {
        Self::new(TokenKind::Eof, "", position)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            write!(f, "{}@{}", self.kind, self.position)
        } else {
            write!(f, "{} '{}'@{}", self.kind, self.lexeme, self.position)
        }
    }
}
