//! # 运算符规则
//!
//! 二元运算按两个操作数的**运行时类型组合**分派：
//!
//! | 运算符 | Int⊗Int | Dec⊗Dec | Int⊗Dec | Str⊗Str | Bool⊗Bool |
//! |---|---|---|---|---|---|
//! | `+` | 和 | 和 | 拓宽后求和 | 拼接 | - |
//! | `-` | 差 | 差 | 拓宽后求差 | 删除第一次出现的右串 | - |
//! | `*` | 积 | 积 | 拓宽后求积 | - | - |
//! | `/` | 整除 | 商 | 拓宽后求商 | - | - |
//! | `&&` | - | - | - | - | 与 |
//! | `\|\|` | - | - | - | - | 或 |
//!
//! 表中未列出的组合一律返回 [`EvalError::TypeMismatch`]。
//! 除 Integer → Decimal 拓宽外没有其他隐式转换。

use rust_decimal::Decimal;

use crate::error::EvalError;
use crate::syntax::ast::{BinaryOperator, UnaryOperator};
use crate::value::Value;

/// 应用二元运算符
pub fn apply_binary(
    operator: BinaryOperator,
    left: Value,
    right: Value,
) -> Result<Value, EvalError> {
    let mismatch = EvalError::TypeMismatch {
        operator,
        left: left.kind(),
        right: right.kind(),
    };

    match (operator, left, right) {
        (BinaryOperator::And, Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a && b)),
        (BinaryOperator::Or, Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a || b)),

        (BinaryOperator::Add, Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
        (BinaryOperator::Subtract, Value::String(a), Value::String(b)) => {
            Ok(Value::String(remove_first(&a, &b)))
        }

        (op, left, right) if !op.is_logical() => match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => integer_arith(op, a, b),
            (Value::Decimal(a), Value::Decimal(b)) => decimal_arith(op, a, b),
            (Value::Integer(a), Value::Decimal(b)) => decimal_arith(op, Decimal::from(a), b),
            (Value::Decimal(a), Value::Integer(b)) => decimal_arith(op, a, Decimal::from(b)),
            _ => Err(mismatch),
        },

        _ => Err(mismatch),
    }
}

/// 应用一元运算符
pub fn apply_unary(operator: UnaryOperator, operand: Value) -> Result<Value, EvalError> {
    match (operator, operand) {
        (UnaryOperator::Negate, Value::Integer(n)) => n
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| overflow(operator)),
        (UnaryOperator::Negate, Value::Decimal(d)) => Ok(Value::Decimal(-d)),
        (operator, other) => Err(EvalError::UnaryTypeMismatch {
            operator,
            operand: other.kind(),
        }),
    }
}

/// 删除 `needle` 在 `haystack` 中的第一次出现（区分大小写），不存在时原样返回
fn remove_first(haystack: &str, needle: &str) -> String {
    haystack.replacen(needle, "", 1)
}

fn integer_arith(op: BinaryOperator, a: i64, b: i64) -> Result<Value, EvalError> {
    let result = match op {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_div(b)
        }
        BinaryOperator::And | BinaryOperator::Or => unreachable!("逻辑运算符不参与算术分派"),
    };
    result.map(Value::Integer).ok_or_else(|| overflow(op))
}

fn decimal_arith(op: BinaryOperator, a: Decimal, b: Decimal) -> Result<Value, EvalError> {
    let result = match op {
        BinaryOperator::Add => a.checked_add(b),
        BinaryOperator::Subtract => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide => {
            if b.is_zero() {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_div(b)
        }
        BinaryOperator::And | BinaryOperator::Or => unreachable!("逻辑运算符不参与算术分派"),
    };
    result.map(Value::Decimal).ok_or_else(|| overflow(op))
}

fn overflow(operator: impl std::fmt::Display) -> EvalError {
    EvalError::Overflow {
        operator: operator.to_string(),
    }
}
