//! # Syntax 模块
//!
//! 文本到语法树：词法分析、AST 定义和解析器。
//!
//! ## 模块结构
//!
//! - [`token`]：Token 定义
//! - [`lexer`]：惰性词法分析器
//! - [`ast`]：表达式树与解析结果
//! - [`parser`]：优先级分层的递归下降解析器

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::*;
pub use lexer::Lexer;
pub use parser::{ParseLimits, Parser};
pub use token::{Token, TokenKind};
