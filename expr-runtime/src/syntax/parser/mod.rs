//! # 表达式解析器
//!
//! 递归下降 + 优先级分层的表达式解析器。
//!
//! ## 语法（优先级从低到高）
//!
//! ```text
//! assignment     := IDENTIFIER '=' expression | expression
//! expression     := logicalOr
//! logicalOr      := logicalAnd ('||' logicalAnd)*
//! logicalAnd     := additive ('&&' additive)*
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/') unary)*
//! unary          := '-' unary | primary
//! primary        := NUMBER | STRING | BOOLEAN | IDENTIFIER | '(' expression ')'
//! ```
//!
//! 所有二元运算符左结合，同一层的运算符循环消费，`a - b - c` 解析为 `(a - b) - c`。
//! 逻辑运算符的优先级低于全部算术运算符。
//!
//! ## 限制
//!
//! - 括号和一元取负每层递归一次，层数受 [`ParseLimits::max_depth`] 限制
//! - 同一层的运算符链不递归，长度受 [`ParseLimits::max_chain_length`] 限制
//!
//! 解析在第一个错误处终止，不做错误恢复。

use crate::error::{ExprResult, ParseError};
use crate::syntax::ast::{Assignment, BinaryOperator, Expr, ParseResult};
use crate::syntax::lexer::Lexer;
use crate::syntax::token::{Token, TokenKind};


/// 默认的最大嵌套深度
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// 默认的单层运算符链最大长度
pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 4096;

/// 解析限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// 括号 / 一元取负的最大嵌套层数
    pub max_depth: usize,
    /// 同一优先级上连续运算符的最大个数
    pub max_chain_length: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
        }
    }
}

/// 词法分析 + 语法分析
pub fn parse(input: &str, limits: ParseLimits) -> ExprResult<ParseResult> {
    let tokens = Lexer::tokenize(input)?;
    Ok(Parser::new(tokens, limits).parse()?)
}

/// 表达式解析器
///
/// 消费一个以 `Eof` 结尾的 token 序列，产出一个 [`ParseResult`]。
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    limits: ParseLimits,
    /// 当前的括号 / 一元运算递归层数
    nesting: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>, limits: ParseLimits) -> Self {
        if !tokens.last().is_some_and(Token::is_eof) {
            let end = tokens
                .last()
                .map(|t| t.position + t.lexeme.len())
                .unwrap_or(0);
            tokens.push(Token::eof(end));
        }
        Self {
            tokens,
            pos: 0,
            limits,
            nesting: 0,
        }
    }

    /// 解析完整输入
    ///
    /// 仅当第一个 token 是标识符且紧跟 `=` 时识别为赋值。
    pub fn parse(mut self) -> Result<ParseResult, ParseError> {
        let result = if self.peek().kind == TokenKind::Identifier
            && self.peek_nth(1).kind == TokenKind::Assign
        {
            let variable = self.advance().lexeme;
            self.advance();
            let expression = self.parse_expression()?;
            ParseResult::Assignment(Assignment {
                variable,
                expression,
            })
        } else {
            ParseResult::Expression(self.parse_expression()?)
        };

        let trailing = self.peek();
        if !trailing.is_eof() {
            return Err(unexpected(trailing));
        }
        Ok(result)
    }

    fn peek(&self) -> &Token {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    /// 当前 token 是 `ops` 中的某个运算符时消费并返回它
    fn match_operator(&mut self, ops: &[BinaryOperator]) -> Option<(BinaryOperator, usize)> {
        match self.peek().kind {
            TokenKind::Operator(op) if ops.contains(&op) => {
                let position = self.advance().position;
                Some((op, position))
            }
            _ => None,
        }
    }

    /// 进入一层括号或一元运算
    fn enter(&mut self, position: usize) -> Result<(), ParseError> {
        self.nesting += 1;
        if self.nesting > self.limits.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.limits.max_depth,
                position,
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }

    /// 同一优先级的左结合二元运算
    fn parse_binary_level(
        &mut self,
        ops: &[BinaryOperator],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;
        let mut length = 0;

        while let Some((operator, position)) = self.match_operator(ops) {
            length += 1;
            if length > self.limits.max_chain_length {
                return Err(ParseError::ChainTooLong {
                    limit: self.limits.max_chain_length,
                    position,
                });
            }
            let right = next(self)?;
            left = Expr::binary(operator, left, right);
        }

        Ok(left)
    }

    /// 解析 `||`（最低优先级）
    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[BinaryOperator::Or], Self::parse_and)
    }

    /// 解析 `&&`
    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&[BinaryOperator::And], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[BinaryOperator::Add, BinaryOperator::Subtract],
            Self::parse_multiplicative,
        )
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(
            &[BinaryOperator::Multiply, BinaryOperator::Divide],
            Self::parse_unary,
        )
    }

    /// 解析一元取负
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let Some((_, position)) = self.match_operator(&[BinaryOperator::Subtract]) else {
            return self.parse_primary();
        };

        self.enter(position)?;
        let operand = self.parse_unary()?;
        self.leave();

        Ok(Expr::negate(operand))
    }

    /// 解析基本表达式
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.advance();

        match token.kind {
            TokenKind::Number | TokenKind::String | TokenKind::Boolean => {
                let value = token.literal.clone().ok_or_else(|| unexpected(&token))?;
                Ok(Expr::Literal(value))
            }

            TokenKind::Identifier => Ok(Expr::Variable(token.lexeme)),

            TokenKind::LParen => {
                self.enter(token.position)?;
                let inner = self.parse_expression()?;
                self.leave();

                let closing = self.advance();
                match closing.kind {
                    TokenKind::RParen => Ok(Expr::group(inner)),
                    TokenKind::Eof => Err(ParseError::UnmatchedParenthesis {
                        position: token.position,
                    }),
                    _ => Err(unexpected(&closing)),
                }
            }

            TokenKind::Eof => Err(ParseError::UnexpectedEof {
                position: token.position,
            }),

            TokenKind::Operator(_) | TokenKind::RParen | TokenKind::Assign => {
                Err(unexpected(&token))
            }
        }
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        found: token.lexeme.clone(),
        position: token.position,
    }
}
