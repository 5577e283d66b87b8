//! # AST 模块
//!
//! 定义表达式抽象语法树和解析结果。
//!
//! ## 设计原则
//!
//! - 树在构建后**不可变**
//! - 所有权严格从父节点流向子节点，节点不持有父引用
//! - 运算符只能是固定枚举集合中的一个

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// 二元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOperator {
    /// 运算符的源码形式
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }

    /// 是否为逻辑运算符
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// 一元运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// 算术取负 `-`
    Negate,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Negate => f.write_str("-"),
        }
    }
}

/// 表达式 AST 节点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// 字面量值
    ///
    /// 值的类型在词法阶段由字面形式决定
    Literal(Value),

    /// 变量引用
    Variable(String),

    /// 括号分组
    Grouping(Box<Expr>),

    /// 二元运算
    BinaryOp {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// 一元运算
    UnaryOp {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
}

impl Expr {
    /// 创建字面量
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// 创建整数字面量
    pub fn int(n: i64) -> Self {
        Self::Literal(Value::Integer(n))
    }

    /// 创建小数字面量
    pub fn decimal(d: Decimal) -> Self {
        Self::Literal(Value::Decimal(d))
    }

    /// 创建字符串字面量
    pub fn string(s: impl Into<String>) -> Self {
        Self::Literal(Value::String(s.into()))
    }

    /// 创建布尔字面量
    pub fn bool(b: bool) -> Self {
        Self::Literal(Value::Boolean(b))
    }

    /// 创建变量引用
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// 创建括号分组
    pub fn group(inner: Expr) -> Self {
        Self::Grouping(Box::new(inner))
    }

    /// 创建二元运算
    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr) -> Self {
        Self::BinaryOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// 创建取负运算
    pub fn negate(operand: Expr) -> Self {
        Self::UnaryOp {
            operator: UnaryOperator::Negate,
            operand: Box::new(operand),
        }
    }

    /// 树的深度（叶子节点为 1）
    pub fn depth(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Variable(_) => 1,
            Expr::Grouping(inner) => inner.depth() + 1,
            Expr::BinaryOp { left, right, .. } => left.depth().max(right.depth()) + 1,
            Expr::UnaryOp { operand, .. } => operand.depth() + 1,
        }
    }
}

/// 以完全括号化的前缀形式输出，例如 `(+ 1 (* 2 3))`
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(Value::String(s)) => write!(f, "\"{}\"", s),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Variable(name) => f.write_str(name),
            Expr::Grouping(inner) => write!(f, "(group {})", inner),
            Expr::BinaryOp {
                operator,
                left,
                right,
            } => write!(f, "({} {} {})", operator, left, right),
            Expr::UnaryOp { operator, operand } => write!(f, "({} {})", operator, operand),
        }
    }
}

/// 赋值语句：`IDENTIFIER = expression`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// 被赋值的变量名（总是合法标识符）
    pub variable: String,
    /// 右侧表达式
    pub expression: Expr,
}

/// 单个输入字符串的解析结果
///
/// 调用方通过模式匹配区分两种形态，不需要向下转型。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParseResult {
    /// 普通表达式
    Expression(Expr),
    /// 赋值
    Assignment(Assignment),
}

impl ParseResult {
    /// 是否为赋值
    pub fn is_assignment(&self) -> bool {
        matches!(self, ParseResult::Assignment(_))
    }

    /// 赋值的变量名；普通表达式返回 `None`
    pub fn variable(&self) -> Option<&str> {
        match self {
            ParseResult::Assignment(assignment) => Some(&assignment.variable),
            ParseResult::Expression(_) => None,
        }
    }

    /// 需要求值的表达式（赋值时为右侧表达式）
    pub fn expression(&self) -> &Expr {
        match self {
            ParseResult::Expression(expr) => expr,
            ParseResult::Assignment(assignment) => &assignment.expression,
        }
    }

    pub fn into_expression(self) -> Expr {
        match self {
            ParseResult::Expression(expr) => expr,
            ParseResult::Assignment(assignment) => assignment.expression,
        }
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseResult::Expression(expr) => write!(f, "{}", expr),
            ParseResult::Assignment(Assignment {
                variable,
                expression,
            }) => write!(f, "(= {} {})", variable, expression),
        }
    }
}
