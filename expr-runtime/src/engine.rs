//! # Engine 模块
//!
//! 求值引擎门面，组合 Lexer → Parser → Evaluator。
//!
//! ## 数据流
//!
//! ```text
//! text ─► tokens ─► ParseResult ─► Value ─► T (调用方请求的原生类型)
//! ```
//!
//! 引擎本身不持有可变状态，每次调用相互独立，可以在线程间共享。
//! 赋值结果不会被保存：变量环境归调用方所有。

use tracing::debug;

use crate::config::{ConfigError, EngineConfig};
use crate::error::{ExprResult, LexError};
use crate::eval::{Evaluator, NoVariables, VariableLookup};
use crate::syntax::ast::{Expr, ParseResult};
use crate::syntax::lexer::Lexer;
use crate::syntax::parser;
use crate::syntax::token::Token;
use crate::value::{FromValue, Value};

/// 表达式求值引擎
///
/// # 使用示例
///
/// ```ignore
/// let engine = EvaluationEngine::new();
///
/// let n: i64 = engine.evaluate("(2 + 2) * 5")?;
///
/// match engine.parse("x = 1 + 2")? {
///     ParseResult::Assignment(a) => {
///         let value: i64 = engine.evaluate_expression(&a.expression)?;
///         env.insert(a.variable, value.into());
///     }
///     ParseResult::Expression(expr) => { /* ... */ }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvaluationEngine {
    config: EngineConfig,
    evaluator: Evaluator,
}

impl EvaluationEngine {
    /// 使用默认配置创建引擎
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定配置创建引擎
    ///
    /// 配置无效（例如 `max_depth` 为 0）时返回 [`ConfigError::ValidationFailed`]。
    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let evaluator = Evaluator::new(&config);
        Ok(Self { config, evaluator })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 只做词法分析
    pub fn tokenize(&self, text: &str) -> Result<Vec<Token>, LexError> {
        Lexer::tokenize(text)
    }

    /// 解析输入，返回表达式或赋值
    pub fn parse(&self, text: &str) -> ExprResult<ParseResult> {
        let result = parser::parse(text, self.config.parse_limits())?;
        debug!(
            input = text,
            assignment = result.is_assignment(),
            "parsed"
        );
        Ok(result)
    }

    /// 解析并求值，转换为 `T`
    ///
    /// 输入为赋值时求值其右侧表达式。
    pub fn evaluate<T: FromValue>(&self, text: &str) -> ExprResult<T> {
        self.evaluate_with(text, &NoVariables)
    }

    /// 使用调用方提供的变量解析并求值
    pub fn evaluate_with<T, V>(&self, text: &str, vars: &V) -> ExprResult<T>
    where
        T: FromValue,
        V: VariableLookup + ?Sized,
    {
        let value = self.evaluate_value(text, vars)?;
        Ok(T::from_value(value)?)
    }

    /// 解析并求值，返回未转换的 [`Value`]
    pub fn evaluate_value<V>(&self, text: &str, vars: &V) -> ExprResult<Value>
    where
        V: VariableLookup + ?Sized,
    {
        let parsed = self.parse(text)?;
        let value = self.evaluator.evaluate(parsed.expression(), vars)?;
        debug!(input = text, kind = %value.kind(), "evaluated");
        Ok(value)
    }

    /// 对已解析的表达式求值，跳过解析阶段
    pub fn evaluate_expression<T: FromValue>(&self, expr: &Expr) -> ExprResult<T> {
        self.evaluate_expression_with(expr, &NoVariables)
    }

    /// 使用调用方提供的变量对已解析的表达式求值
    pub fn evaluate_expression_with<T, V>(&self, expr: &Expr, vars: &V) -> ExprResult<T>
    where
        T: FromValue,
        V: VariableLookup + ?Sized,
    {
        let value = self.evaluator.evaluate(expr, vars)?;
        Ok(T::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rust_decimal::Decimal;

    use super::*;
    use crate::error::{ConversionError, EvalError, ExprError, ParseError};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_basic_integers() {
        let engine = EvaluationEngine::new();
        assert_eq!(engine.evaluate::<i64>("2 + 1").unwrap(), 3);
        assert_eq!(engine.evaluate::<i64>("4 - 5").unwrap(), -1);
        assert_eq!(engine.evaluate::<i64>("3 * 10").unwrap(), 30);
        assert_eq!(engine.evaluate::<i64>("6/2").unwrap(), 3);
    }

    #[test]
    fn test_basic_decimals() {
        let engine = EvaluationEngine::new();
        assert_eq!(engine.evaluate::<Decimal>("2.2 + 1.45").unwrap(), dec("3.65"));
        assert_eq!(engine.evaluate::<Decimal>("10.2 - 0.3").unwrap(), dec("9.9"));
        assert_eq!(engine.evaluate::<Decimal>("1.3 * 2").unwrap(), dec("2.6"));
        assert_eq!(engine.evaluate::<Decimal>("4.8/4").unwrap(), dec("1.2"));
    }

    #[test]
    fn test_basic_strings() {
        let engine = EvaluationEngine::new();
        assert_eq!(
            engine
                .evaluate::<String>(r#""Hello, " + "world!""#)
                .unwrap(),
            "Hello, world!"
        );
        assert_eq!(
            engine.evaluate::<String>(r#""KARATE" - "AR""#).unwrap(),
            "KATE"
        );
    }

    #[test]
    fn test_basic_booleans() {
        let engine = EvaluationEngine::new();
        assert!(!engine.evaluate::<bool>("true && false").unwrap());
        assert!(engine.evaluate::<bool>("true && true").unwrap());
        assert!(engine.evaluate::<bool>("true || false").unwrap());
        assert!(engine.evaluate::<bool>("true || true").unwrap());
        assert!(!engine.evaluate::<bool>("false || false").unwrap());
    }

    #[test]
    fn test_precedence() {
        let engine = EvaluationEngine::new();
        assert_eq!(engine.evaluate::<i64>("2 * 2 + 5").unwrap(), 9);
        assert_eq!(engine.evaluate::<i64>("10 / 5 - 6").unwrap(), -4);
        assert_eq!(engine.evaluate::<i64>("2 + 2 * 5").unwrap(), 12);
        assert_eq!(engine.evaluate::<i64>("6 - 10 / 5").unwrap(), 4);
    }

    #[test]
    fn test_parentheses() {
        let engine = EvaluationEngine::new();
        assert_eq!(engine.evaluate::<i64>("(2 + 2) * 5").unwrap(), 20);
        assert_eq!(engine.evaluate::<i64>("(6 - 10) / 4").unwrap(), -1);
        assert_eq!(engine.evaluate::<i64>("5 * (2 + 2)").unwrap(), 20);
        // Decimal 结果 -1.00 可以转换为整数
        assert_eq!(engine.evaluate::<i64>("0.25 * (6 - 10)").unwrap(), -1);
        assert_eq!(engine.evaluate::<i32>("0.25 * (6 - 10)").unwrap(), -1);
    }

    #[test]
    fn test_assignment() {
        let engine = EvaluationEngine::new();
        let result = engine.parse("x = (2 + 2) * 5").unwrap();

        assert!(result.is_assignment());
        let ParseResult::Assignment(assignment) = result else {
            panic!("期望赋值");
        };
        assert_eq!(assignment.variable, "x");
        assert_eq!(
            engine
                .evaluate_expression::<i64>(&assignment.expression)
                .unwrap(),
            20
        );
    }

    #[test]
    fn test_evaluate_assignment_text_yields_right_hand_side() {
        let engine = EvaluationEngine::new();
        assert_eq!(engine.evaluate::<i64>("y = 3 * 3").unwrap(), 9);
    }

    #[test]
    fn test_unary_minus() {
        let engine = EvaluationEngine::new();
        assert_eq!(engine.evaluate::<i64>("-3 + 5").unwrap(), 2);
        assert_eq!(engine.evaluate::<Decimal>("-(1.5 * 2)").unwrap(), dec("-3"));
        assert!(matches!(
            engine.evaluate::<bool>("-true"),
            Err(ExprError::Eval(EvalError::UnaryTypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_division_by_zero() {
        let engine = EvaluationEngine::new();
        assert_eq!(
            engine.evaluate::<i64>("1 / 0"),
            Err(ExprError::Eval(EvalError::DivisionByZero))
        );
        assert_eq!(
            engine.evaluate::<Decimal>("1.5 / (2 - 2)"),
            Err(ExprError::Eval(EvalError::DivisionByZero))
        );
    }

    #[test]
    fn test_type_mismatch() {
        let engine = EvaluationEngine::new();
        assert!(matches!(
            engine.evaluate::<i64>("true + 1"),
            Err(ExprError::Eval(EvalError::TypeMismatch { .. }))
        ));
        assert!(matches!(
            engine.evaluate::<String>(r#""a" * "b""#),
            Err(ExprError::Eval(EvalError::TypeMismatch { .. }))
        ));
    }

    #[test]
    fn test_conversion_error() {
        let engine = EvaluationEngine::new();
        assert!(matches!(
            engine.evaluate::<bool>("1 + 1"),
            Err(ExprError::Conversion(ConversionError::KindMismatch { .. }))
        ));
        assert!(matches!(
            engine.evaluate::<i64>("1.5 * 1"),
            Err(ExprError::Conversion(ConversionError::NotIntegral { .. }))
        ));
        assert!(matches!(
            engine.evaluate::<String>("42"),
            Err(ExprError::Conversion(_))
        ));
    }

    #[test]
    fn test_parse_and_lex_errors() {
        let engine = EvaluationEngine::new();
        assert_eq!(
            engine.evaluate::<i64>("(1 + 2"),
            Err(ExprError::Parse(ParseError::UnmatchedParenthesis { position: 0 }))
        );
        assert!(matches!(
            engine.parse("1 ? 2"),
            Err(ExprError::Lex(LexError::UnexpectedCharacter { ch: '?', .. }))
        ));
    }

    #[test]
    fn test_variables_supplied_by_caller() {
        let engine = EvaluationEngine::new();
        let mut vars = HashMap::new();
        vars.insert("price".to_string(), Value::from(dec("2.5")));
        vars.insert("qty".to_string(), Value::from(4));

        assert_eq!(
            engine
                .evaluate_with::<Decimal, _>("price * qty", &vars)
                .unwrap(),
            dec("10")
        );
        assert_eq!(
            engine.evaluate::<i64>("qty + 1"),
            Err(ExprError::Eval(EvalError::UnboundVariable {
                name: "qty".to_string()
            }))
        );
    }

    #[test]
    fn test_evaluate_value_keeps_kind() {
        let engine = EvaluationEngine::new();
        assert_eq!(
            engine.evaluate_value("1 + 0.5", &NoVariables).unwrap(),
            Value::Decimal(dec("1.5"))
        );
        assert_eq!(
            engine.evaluate::<Value>("\"a\" + \"b\"").unwrap(),
            Value::from("ab")
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let engine = EvaluationEngine::new();
        let text = "(10.2 - 0.3) * 2 + 1";
        let first = engine.evaluate::<Value>(text).unwrap();
        let second = engine.evaluate::<Value>(text).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_circuit_config() {
        let engine = EvaluationEngine::with_config(EngineConfig {
            short_circuit_logic: true,
            ..EngineConfig::default()
        })
        .unwrap();
        assert!(engine.config().short_circuit_logic);
        assert!(!engine.evaluate::<bool>("false && missing").unwrap());
        assert!(EvaluationEngine::new()
            .evaluate::<bool>("false && missing")
            .is_err());
    }

    #[test]
    fn test_with_config_rejects_invalid_config() {
        assert!(matches!(
            EvaluationEngine::with_config(EngineConfig {
                max_depth: 0,
                ..EngineConfig::default()
            }),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert!(matches!(
            EvaluationEngine::with_config(EngineConfig {
                max_chain_length: 0,
                ..EngineConfig::default()
            }),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_long_flat_chains() {
        let engine = EvaluationEngine::new();
        let sum = vec!["1"; 1000].join(" + ");
        assert_eq!(engine.evaluate::<i64>(&sum), Ok(1000));

        let difference = vec!["0.5"; 300].join(" - ");
        assert_eq!(engine.evaluate::<Decimal>(&difference), Ok(dec("-149")));

        let words = vec![r#""ab""#; 1000].join(" + ");
        assert_eq!(engine.evaluate::<String>(&words).unwrap().len(), 2000);

        let mixed = format!("{} && true", vec!["true"; 1000].join(" || "));
        assert_eq!(engine.evaluate::<bool>(&mixed), Ok(true));
    }

    #[test]
    fn test_chain_length_limit() {
        let engine = EvaluationEngine::with_config(EngineConfig {
            max_chain_length: 3,
            ..EngineConfig::default()
        })
        .unwrap();
        assert_eq!(engine.evaluate::<i64>("1 + 1 + 1 + 1"), Ok(4));
        assert_eq!(
            engine.evaluate::<i64>("1 + 1 + 1 + 1 + 1"),
            Err(ExprError::Parse(ParseError::ChainTooLong {
                limit: 3,
                position: 14
            }))
        );
        // 每一层单独计数
        assert_eq!(engine.evaluate::<i64>("1 * 1 * 1 * 1 + 2 * 2 * 2 * 2"), Ok(17));
    }

    #[test]
    fn test_engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EvaluationEngine>();

        let engine = std::sync::Arc::new(EvaluationEngine::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let engine = engine.clone();
                std::thread::spawn(move || engine.evaluate::<i64>(&format!("{} * 2", i)))
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap().unwrap(), i as i64 * 2);
        }
    }

    #[test]
    fn test_tokenize() {
        let engine = EvaluationEngine::new();
        let tokens = engine.tokenize("x = 1").unwrap();
        assert_eq!(tokens.len(), 4);
        assert!(tokens[3].is_eof());
    }
}
