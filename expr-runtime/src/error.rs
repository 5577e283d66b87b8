//! # Error 模块
//!
//! 定义 expr-runtime 中使用的错误类型。
//!
//! 每一层（词法、语法、求值、类型转换）都有独立的错误枚举，
//! [`ExprError`] 将它们统一起来供门面层返回。所有错误都在检测点立即返回，
//! 不做任何恢复或默认值替换。

use thiserror::Error;

use crate::syntax::ast::{BinaryOperator, UnaryOperator};
use crate::value::ValueKind;

/// 词法错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// 无法识别的字符
    #[error("位置 {position}：无法识别的字符 '{ch}'")]
    UnexpectedCharacter { ch: char, position: usize },

    /// 数字格式错误（多个小数点、小数点结尾或整数溢出）
    #[error("位置 {position}：无效的数字 '{lexeme}'")]
    MalformedNumber { lexeme: String, position: usize },

    /// 字符串缺少右引号
    #[error("位置 {position}：字符串字面量未闭合，缺少 '\"'")]
    UnterminatedString { position: usize },
}

/// 语法错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// 当前位置不允许出现该 token
    #[error("位置 {position}：意外的 token '{found}'")]
    UnexpectedToken { found: String, position: usize },

    /// 表达式意外结束
    #[error("位置 {position}：表达式意外结束")]
    UnexpectedEof { position: usize },

    /// 缺少右括号
    ///
    /// `position` 指向未闭合的左括号
    #[error("位置 {position}：左括号缺少匹配的 ')'")]
    UnmatchedParenthesis { position: usize },

    /// 括号 / 一元取负嵌套过深
    #[error("位置 {position}：表达式嵌套超过上限 {limit}")]
    NestingTooDeep { limit: usize, position: usize },

    /// 同一层的运算符过多
    #[error("位置 {position}：运算符链长度超过上限 {limit}")]
    ChainTooLong { limit: usize, position: usize },
}

/// 求值错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// 二元运算符不支持该类型组合
    #[error("类型不匹配: 运算符 '{operator}' 不支持 {left} 与 {right}")]
    TypeMismatch {
        operator: BinaryOperator,
        left: ValueKind,
        right: ValueKind,
    },

    /// 一元运算符不支持该类型
    #[error("类型不匹配: 一元运算符 '{operator}' 不支持 {operand}")]
    UnaryTypeMismatch {
        operator: UnaryOperator,
        operand: ValueKind,
    },

    /// 除数为零
    #[error("除数为零")]
    DivisionByZero,

    /// 变量未定义
    #[error("变量 '{name}' 未定义")]
    UnboundVariable { name: String },

    /// 算术溢出
    #[error("运算 '{operator}' 溢出")]
    Overflow { operator: String },

    /// 表达式嵌套超过深度上限
    #[error("表达式嵌套深度超过上限 {limit}")]
    DepthLimitExceeded { limit: usize },
}

/// 值类型转换错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// 值的类型无法表示目标类型
    #[error("无法转换: 期望 {expected}，实际 {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: ValueKind,
    },

    /// 小数带有小数部分，无法转为整数
    #[error("无法转换: {value} 不是整数")]
    NotIntegral { value: String },

    /// 数值超出目标类型范围
    #[error("无法转换: {value} 超出 {expected} 的范围")]
    OutOfRange {
        expected: &'static str,
        value: String,
    },
}

/// expr-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    /// 词法错误
    #[error("词法错误: {0}")]
    Lex(#[from] LexError),

    /// 语法错误
    #[error("语法错误: {0}")]
    Parse(#[from] ParseError),

    /// 求值错误
    #[error("求值错误: {0}")]
    Eval(#[from] EvalError),

    /// 类型转换错误
    #[error("转换错误: {0}")]
    Conversion(#[from] ConversionError),
}

/// Result 类型别名
pub type ExprResult<T> = Result<T, ExprError>;
