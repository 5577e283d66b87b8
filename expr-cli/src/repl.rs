//! 交互式求值循环
//!
//! 每行一个输入。赋值会把右侧的值存入会话环境，普通表达式输出结果。
//! 出错时输出错误并继续读取下一行。
//!
//! 内置命令：`:vars` 列出会话变量，`:quit` 退出。

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use expr_runtime::{EvaluationEngine, ExprResult, ParseResult, Value};
use tracing::debug;

const PROMPT: &str = "> ";

pub fn run(
    engine: &EvaluationEngine,
    input: impl BufRead,
    mut output: impl Write,
) -> anyhow::Result<()> {
    let mut env: BTreeMap<String, Value> = BTreeMap::new();

    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        match line {
            "" => {}
            ":quit" => break,
            ":vars" => {
                for (name, value) in &env {
                    writeln!(output, "{name} = {value:?}")?;
                }
            }
            _ => match eval_line(engine, line, &mut env) {
                Ok(text) => writeln!(output, "{text}")?,
                Err(e) => writeln!(output, "error: {e}")?,
            },
        }

        write!(output, "{PROMPT}")?;
        output.flush()?;
    }

    Ok(())
}

/// 求值一行输入，赋值时更新会话环境
fn eval_line(
    engine: &EvaluationEngine,
    line: &str,
    env: &mut BTreeMap<String, Value>,
) -> ExprResult<String> {
    match engine.parse(line)? {
        ParseResult::Assignment(assignment) => {
            let value: Value = engine.evaluate_expression_with(&assignment.expression, &*env)?;
            debug!(variable = %assignment.variable, kind = %value.kind(), "assigned");
            let text = format!("{} = {}", assignment.variable, value);
            env.insert(assignment.variable, value);
            Ok(text)
        }
        ParseResult::Expression(expr) => {
            let value: Value = engine.evaluate_expression_with(&expr, &*env)?;
            Ok(value.to_string())
        }
    }
}
