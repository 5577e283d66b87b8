//! # Value 模块
//!
//! 定义表达式运行时的值模型。
//!
//! ## 支持的类型
//!
//! - `Integer`: 64 位有符号整数
//! - `Decimal`: 定点小数（[`rust_decimal::Decimal`]，十进制精确表示）
//! - `String`: 字符串
//! - `Boolean`: 布尔值
//!
//! 值之间不存在隐式转换，运算符规则见 [`crate::eval::ops`]。
//! 调用方通过 [`FromValue`] 将求值结果显式转换为原生类型。

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::ConversionError;

/// 运行时值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// 整数
    Integer(i64),
    /// 定点小数
    Decimal(Decimal),
    /// 字符串
    String(String),
    /// 布尔值
    Boolean(bool),
}

/// 值的类型标签
///
/// 用于错误信息和转换检查。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Integer,
    Decimal,
    String,
    Boolean,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "Integer",
            ValueKind::Decimal => "Decimal",
            ValueKind::String => "String",
            ValueKind::Boolean => "Boolean",
        };
        f.write_str(name)
    }
}

impl Value {
    /// 获取值的类型标签
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Integer(_) => ValueKind::Integer,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::String(_) => ValueKind::String,
            Value::Boolean(_) => ValueKind::Boolean,
        }
    }

    /// 是否为数值类型（Integer 或 Decimal）
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Decimal(_))
    }

    /// 转换为调用方请求的原生类型
    pub fn convert<T: FromValue>(self) -> Result<T, ConversionError> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// 从 [`Value`] 到原生类型的显式转换
///
/// 类型不兼容时返回 [`ConversionError`]，不做任何兜底。
pub trait FromValue: Sized {
    /// 目标类型名，用于错误信息
    const EXPECTED: &'static str;

    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

impl FromValue for Value {
    const EXPECTED: &'static str = "Value";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        Ok(value)
    }
}

/// 整数：接受 Integer，以及小数部分为零的 Decimal（如 `-1.00`）
impl FromValue for i64 {
    const EXPECTED: &'static str = "Integer";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(n) => Ok(n),
            Value::Decimal(d) => {
                if !d.fract().is_zero() {
                    return Err(ConversionError::NotIntegral {
                        value: d.to_string(),
                    });
                }
                d.to_i64().ok_or_else(|| ConversionError::OutOfRange {
                    expected: Self::EXPECTED,
                    value: d.to_string(),
                })
            }
            other => Err(ConversionError::KindMismatch {
                expected: Self::EXPECTED,
                actual: other.kind(),
            }),
        }
    }
}

impl FromValue for i32 {
    const EXPECTED: &'static str = "i32";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| ConversionError::OutOfRange {
            expected: Self::EXPECTED,
            value: wide.to_string(),
        })
    }
}

/// 小数：接受 Decimal，Integer 会被拓宽
impl FromValue for Decimal {
    const EXPECTED: &'static str = "Decimal";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Integer(n) => Ok(Decimal::from(n)),
            other => Err(ConversionError::KindMismatch {
                expected: Self::EXPECTED,
                actual: other.kind(),
            }),
        }
    }
}

impl FromValue for String {
    const EXPECTED: &'static str = "String";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(ConversionError::KindMismatch {
                expected: Self::EXPECTED,
                actual: other.kind(),
            }),
        }
    }
}

impl FromValue for bool {
    const EXPECTED: &'static str = "Boolean";

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => Err(ConversionError::KindMismatch {
                expected: Self::EXPECTED,
                actual: other.kind(),
            }),
        }
    }
}
