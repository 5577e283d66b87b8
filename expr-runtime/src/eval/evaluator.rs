//! # 求值器
//!
//! 对表达式树做后序遍历：先求子节点，再应用父节点的运算符规则。
//!
//! ## 设计原则
//!
//! - 求值是**无副作用**的纯函数，不持有任何变量环境
//! - 变量通过调用方提供的 [`VariableLookup`] 解析
//! - 默认不短路：`&&` / `||` 的两侧总是都会求值，
//!   需要短路语义时通过 [`EngineConfig::short_circuit_logic`] 显式开启

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use tracing::trace;

use crate::config::EngineConfig;
use crate::error::EvalError;
use crate::eval::ops::{apply_binary, apply_unary};
use crate::syntax::ast::{BinaryOperator, Expr};
use crate::value::Value;

/// 变量查找能力
///
/// 由调用方提供，求值器本身不保存任何变量。
pub trait VariableLookup {
    /// 获取变量值
    fn get_var(&self, name: &str) -> Option<&Value>;
}

impl<S: BuildHasher> VariableLookup for HashMap<String, Value, S> {
    fn get_var(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl VariableLookup for BTreeMap<String, Value> {
    fn get_var(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// 不提供任何变量；所有变量引用都会失败
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableLookup for NoVariables {
    fn get_var(&self, _name: &str) -> Option<&Value> {
        None
    }
}

/// 表达式求值器
#[derive(Debug, Clone)]
pub struct Evaluator {
    short_circuit: bool,
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Evaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            short_circuit: config.short_circuit_logic,
            max_depth: config.max_depth,
        }
    }

    /// 对表达式求值
    ///
    /// # 参数
    ///
    /// - `expr`: 要求值的表达式
    /// - `vars`: 变量查找（提供变量值）
    pub fn evaluate<V>(&self, expr: &Expr, vars: &V) -> Result<Value, EvalError>
    where
        V: VariableLookup + ?Sized,
    {
        self.eval_node(expr, vars, 1)
    }

    fn eval_node<V>(&self, expr: &Expr, vars: &V, depth: usize) -> Result<Value, EvalError>
    where
        V: VariableLookup + ?Sized,
    {
        if depth > self.max_depth {
            return Err(EvalError::DepthLimitExceeded {
                limit: self.max_depth,
            });
        }

        match expr {
            Expr::Literal(value) => Ok(value.clone()),

            Expr::Variable(name) => vars
                .get_var(name)
                .cloned()
                .ok_or_else(|| EvalError::UnboundVariable { name: name.clone() }),

            Expr::Grouping(inner) => self.eval_node(inner, vars, depth + 1),

            Expr::UnaryOp { operator, operand } => {
                let value = self.eval_node(operand, vars, depth + 1)?;
                apply_unary(*operator, value)
            }

            Expr::BinaryOp { .. } => self.eval_chain(expr, vars, depth),
        }
    }

    /// 沿左侧链迭代求值
    ///
    /// `a + b + c + ...` 是左深的树。左侧链在循环中折叠，只有右操作数递归，
    /// 深度只随嵌套增长，与链长无关。
    fn eval_chain<V>(&self, expr: &Expr, vars: &V, depth: usize) -> Result<Value, EvalError>
    where
        V: VariableLookup + ?Sized,
    {
        let mut chain = Vec::new();
        let mut node = expr;
        while let Expr::BinaryOp {
            operator,
            left,
            right,
        } = node
        {
            chain.push((*operator, right.as_ref()));
            node = left.as_ref();
        }

        let mut acc = self.eval_node(node, vars, depth + 1)?;

        for (operator, right) in chain.into_iter().rev() {
            if self.short_circuit
                && let Some(decided) = short_circuit(operator, &acc)
            {
                trace!(operator = %operator, "short-circuited");
                acc = Value::Boolean(decided);
                continue;
            }

            let right_val = self.eval_node(right, vars, depth + 1)?;
            trace!(
                operator = %operator,
                left = %acc.kind(),
                right = %right_val.kind(),
                "apply binary"
            );
            acc = apply_binary(operator, acc, right_val)?;
        }

        Ok(acc)
    }
}

/// 左操作数已能决定结果时返回该结果
fn short_circuit(operator: BinaryOperator, left: &Value) -> Option<bool> {
    match (operator, left) {
        (BinaryOperator::And, Value::Boolean(false)) => Some(false),
        (BinaryOperator::Or, Value::Boolean(true)) => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    /// 测试用的简单上下文
    struct TestContext {
        vars: HashMap<String, Value>,
    }

    impl TestContext {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
            }
        }

        fn with_var(mut self, name: &str, value: impl Into<Value>) -> Self {
            self.vars.insert(name.to_string(), value.into());
            self
        }
    }

    impl VariableLookup for TestContext {
        fn get_var(&self, name: &str) -> Option<&Value> {
            self.vars.get(name)
        }
    }

    fn short_circuit_evaluator() -> Evaluator {
        Evaluator::new(&EngineConfig {
            short_circuit_logic: true,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_literal_evaluation() {
        let evaluator = Evaluator::default();

        assert_eq!(
            evaluator.evaluate(&Expr::string("hello"), &NoVariables).unwrap(),
            Value::from("hello")
        );
        assert_eq!(
            evaluator.evaluate(&Expr::bool(true), &NoVariables).unwrap(),
            Value::Boolean(true)
        );
        assert_eq!(
            evaluator.evaluate(&Expr::int(42), &NoVariables).unwrap(),
            Value::Integer(42)
        );
    }

    #[test]
    fn test_variable_evaluation() {
        let ctx = TestContext::new()
            .with_var("name", "Alice")
            .with_var("count", 3);
        let evaluator = Evaluator::default();

        assert_eq!(
            evaluator.evaluate(&Expr::var("name"), &ctx).unwrap(),
            Value::from("Alice")
        );

        let expr = Expr::binary(BinaryOperator::Multiply, Expr::var("count"), Expr::int(2));
        assert_eq!(evaluator.evaluate(&expr, &ctx).unwrap(), Value::Integer(6));
    }

    #[test]
    fn test_unbound_variable_error() {
        let result = Evaluator::default().evaluate(&Expr::var("undefined"), &NoVariables);

        assert!(matches!(
            result,
            Err(EvalError::UnboundVariable { name }) if name == "undefined"
        ));
    }

    #[test]
    fn test_std_maps_are_lookups() {
        let evaluator = Evaluator::default();

        let mut hash = HashMap::new();
        hash.insert("x".to_string(), Value::Integer(1));
        assert_eq!(
            evaluator.evaluate(&Expr::var("x"), &hash).unwrap(),
            Value::Integer(1)
        );

        let mut tree = BTreeMap::new();
        tree.insert("y".to_string(), Value::Boolean(true));
        let dyn_lookup: &dyn VariableLookup = &tree;
        assert_eq!(
            evaluator.evaluate(&Expr::var("y"), dyn_lookup).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_post_order_evaluation() {
        // (2 + 2) * 5
        let expr = Expr::binary(
            BinaryOperator::Multiply,
            Expr::group(Expr::binary(BinaryOperator::Add, Expr::int(2), Expr::int(2))),
            Expr::int(5),
        );
        assert_eq!(
            Evaluator::default().evaluate(&expr, &NoVariables).unwrap(),
            Value::Integer(20)
        );
    }

    #[test]
    fn test_logic_is_eager_by_default() {
        // false && undefined：默认两侧都求值，未定义变量会报错
        let expr = Expr::binary(BinaryOperator::And, Expr::bool(false), Expr::var("undefined"));
        assert!(matches!(
            Evaluator::default().evaluate(&expr, &NoVariables),
            Err(EvalError::UnboundVariable { .. })
        ));
    }

    #[test]
    fn test_short_circuit_when_enabled() {
        let evaluator = short_circuit_evaluator();

        let expr = Expr::binary(BinaryOperator::And, Expr::bool(false), Expr::var("undefined"));
        assert_eq!(
            evaluator.evaluate(&expr, &NoVariables).unwrap(),
            Value::Boolean(false)
        );

        let expr = Expr::binary(BinaryOperator::Or, Expr::bool(true), Expr::var("undefined"));
        assert_eq!(
            evaluator.evaluate(&expr, &NoVariables).unwrap(),
            Value::Boolean(true)
        );

        // 左侧无法决定结果时仍然求右侧
        let expr = Expr::binary(BinaryOperator::Or, Expr::bool(false), Expr::bool(true));
        assert_eq!(
            evaluator.evaluate(&expr, &NoVariables).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_short_circuit_still_type_checks_non_boolean_left() {
        let expr = Expr::binary(BinaryOperator::And, Expr::int(0), Expr::bool(true));
        assert_eq!(
            short_circuit_evaluator().evaluate(&expr, &NoVariables),
            Err(EvalError::TypeMismatch {
                operator: BinaryOperator::And,
                left: ValueKind::Integer,
                right: ValueKind::Boolean,
            })
        );
    }

    #[test]
    fn test_errors_propagate_from_children() {
        // 1 / 0 + 1
        let expr = Expr::binary(
            BinaryOperator::Add,
            Expr::binary(BinaryOperator::Divide, Expr::int(1), Expr::int(0)),
            Expr::int(1),
        );
        assert_eq!(
            Evaluator::default().evaluate(&expr, &NoVariables),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_long_left_chain_does_not_count_as_nesting() {
        let mut expr = Expr::int(1);
        for _ in 1..1000 {
            expr = Expr::binary(BinaryOperator::Add, expr, Expr::int(1));
        }
        let evaluator = Evaluator::new(&EngineConfig {
            max_depth: 5,
            ..EngineConfig::default()
        });
        assert_eq!(
            evaluator.evaluate(&expr, &NoVariables),
            Ok(Value::Integer(1000))
        );
    }

    #[test]
    fn test_short_circuit_inside_chain() {
        // false && undefined || true：&& 短路后 || 仍然求右侧
        let expr = Expr::binary(
            BinaryOperator::Or,
            Expr::binary(BinaryOperator::And, Expr::bool(false), Expr::var("undefined")),
            Expr::bool(true),
        );
        assert_eq!(
            short_circuit_evaluator().evaluate(&expr, &NoVariables),
            Ok(Value::Boolean(true))
        );

        // 左侧链上的错误在右操作数之前出现
        let expr = Expr::binary(
            BinaryOperator::Add,
            Expr::binary(BinaryOperator::Add, Expr::var("a"), Expr::int(1)),
            Expr::binary(BinaryOperator::Divide, Expr::int(1), Expr::int(0)),
        );
        assert_eq!(
            Evaluator::default().evaluate(&expr, &NoVariables),
            Err(EvalError::UnboundVariable {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn test_depth_limit_for_hand_built_trees() {
        let mut expr = Expr::int(1);
        for _ in 0..10 {
            expr = Expr::negate(expr);
        }
        let evaluator = Evaluator::new(&EngineConfig {
            max_depth: 5,
            ..EngineConfig::default()
        });
        assert_eq!(
            evaluator.evaluate(&expr, &NoVariables),
            Err(EvalError::DepthLimitExceeded { limit: 5 })
        );
        assert_eq!(
            Evaluator::default().evaluate(&expr, &NoVariables),
            Ok(Value::Integer(1))
        );
    }
}
