//! # Eval 模块
//!
//! 语法树到值：运算符规则和求值器。
//!
//! ## 模块结构
//!
//! - [`ops`]：按运行时类型组合分派的运算符规则
//! - [`evaluator`]：后序遍历求值器和变量查找接口

pub mod evaluator;
pub mod ops;

pub use evaluator::{Evaluator, NoVariables, VariableLookup};
