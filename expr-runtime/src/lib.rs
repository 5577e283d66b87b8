//! # Expr Runtime
//!
//! 小型表达式语言的核心库：把一行算术 / 逻辑 / 字符串表达式（可选带一个赋值）
//! 解析成语法树，再对类型化的值模型求值。
//!
//! ## 架构概述
//!
//! `expr-runtime` 是纯逻辑核心，不做 IO，也不保存变量环境。
//!
//! ```text
//! text ──► Lexer ──► Parser ──► Evaluator ──► Value ──► T
//!           │          │            ▲
//!         Token   ParseResult   VariableLookup (调用方提供)
//! ```
//!
//! ## 核心类型
//!
//! - [`EvaluationEngine`]：门面，组合解析和求值
//! - [`ParseResult`]：表达式或赋值
//! - [`Expr`]：表达式语法树
//! - [`Value`]：运行时值（Integer / Decimal / String / Boolean）
//! - [`FromValue`]：从 `Value` 到原生类型的显式转换
//! - [`VariableLookup`]：调用方提供的变量查找
//!
//! ## 使用示例
//!
//! ```ignore
//! use expr_runtime::EvaluationEngine;
//!
//! let engine = EvaluationEngine::new();
//! assert_eq!(engine.evaluate::<i64>("2 + 2 * 5")?, 12);
//! assert_eq!(engine.evaluate::<String>(r#""KARATE" - "AR""#)?, "KATE");
//! ```
//!
//! ## 模块结构
//!
//! - [`syntax`]：Token、Lexer、AST 和 Parser
//! - [`value`]：值模型和类型转换
//! - [`eval`]：运算符规则和求值器
//! - [`engine`]：求值引擎门面
//! - [`config`]：引擎配置
//! - [`error`]：错误类型定义

pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod syntax;
pub mod value;

// 重导出核心类型
pub use config::{ConfigError, EngineConfig};
pub use engine::EvaluationEngine;
pub use error::{ConversionError, EvalError, ExprError, ExprResult, LexError, ParseError};
pub use eval::{Evaluator, NoVariables, VariableLookup};
pub use rust_decimal::Decimal;
pub use syntax::{
    Assignment, BinaryOperator, Expr, Lexer, ParseLimits, ParseResult, Parser, Token, TokenKind,
    UnaryOperator,
};
pub use value::{FromValue, Value, ValueKind};
