//! # exprc
//!
//! expr-runtime 的命令行宿主。
//!
//! ## 用法
//!
//! ```bash
//! exprc eval "(2 + 2) * 5"
//! exprc eval "price * qty" --var price=2.5 --var qty=4 --as decimal
//! exprc eval "x = 1 + 2" --ast
//! exprc tokens "a && b"
//! exprc repl
//! exprc --config engine.json --short-circuit eval "false && missing"
//! ```
//!
//! 变量环境由宿主维护：`--var` 或 REPL 中的赋值都存放在这里，核心库不保存任何状态。

mod repl;

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use expr_runtime::{
    Decimal, EngineConfig, EvaluationEngine, NoVariables, ParseResult, Value, VariableLookup,
};
use tracing::{Level, debug};

#[derive(Parser)]
#[command(name = "exprc")]
#[command(about = "表达式求值工具 - 解析并计算算术 / 逻辑 / 字符串表达式")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 引擎配置文件（JSON）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 开启 && / || 短路求值
    #[arg(long, global = true)]
    short_circuit: bool,

    /// 括号 / 一元取负的最大嵌套层数
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// 日志详细程度（-v info，-vv debug，-vvv trace）
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 求值一个表达式
    Eval {
        /// 表达式文本
        expression: String,

        /// 变量定义，值本身也是表达式（例如 `name="bob"`、`n=2 * 3`）
        #[arg(long = "var", value_name = "NAME=EXPR")]
        vars: Vec<String>,

        /// 将结果转换为指定类型
        #[arg(long = "as", value_enum)]
        target: Option<Target>,

        /// 只输出语法树
        #[arg(long)]
        ast: bool,
    },

    /// 输出 token 序列
    Tokens {
        /// 表达式文本
        expression: String,
    },

    /// 交互式求值，赋值会保存到会话环境
    Repl,
}

/// 结果的目标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Int,
    Decimal,
    String,
    Bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = real_main(cli) {
        eprintln!("exprc error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(cli.config.as_ref(), cli.short_circuit, cli.max_depth)?;
    debug!(?config, "engine config");
    let engine = EvaluationEngine::with_config(config)?;

    match cli.command {
        Commands::Eval {
            expression,
            vars,
            target,
            ast,
        } => {
            let env = parse_vars(&engine, &vars)?;
            let output = run_eval(&engine, &expression, &env, target, ast)?;
            println!("{output}");
        }
        Commands::Tokens { expression } => {
            for token in engine.tokenize(&expression)? {
                println!("{token}");
            }
        }
        Commands::Repl => {
            let stdin = io::stdin();
            repl::run(&engine, stdin.lock(), io::stdout())?;
        }
    }

    Ok(())
}

/// 合并配置：命令行参数 > 配置文件 > 默认值
fn build_config(
    path: Option<&PathBuf>,
    short_circuit: bool,
    max_depth: Option<usize>,
) -> anyhow::Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if short_circuit {
        config.short_circuit_logic = true;
    }
    if let Some(depth) = max_depth {
        config.max_depth = depth;
    }
    config.validate()?;
    Ok(config)
}

/// 解析 `NAME=EXPR` 形式的变量定义
///
/// 右侧在空环境下求值，不能引用其他变量。
fn parse_vars(
    engine: &EvaluationEngine,
    defs: &[String],
) -> anyhow::Result<HashMap<String, Value>> {
    let mut env = HashMap::new();
    for def in defs {
        let Some((name, expr)) = def.split_once('=') else {
            bail!("变量定义缺少 '=': {def}");
        };
        let name = name.trim();
        if !is_identifier(name) {
            bail!("无效的变量名: '{name}'");
        }
        let value = engine
            .evaluate_value(expr, &NoVariables)
            .with_context(|| format!("变量 '{name}' 的值无效"))?;
        env.insert(name.to_string(), value);
    }
    Ok(env)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// 执行 `eval` 子命令，返回要输出的文本
fn run_eval(
    engine: &EvaluationEngine,
    text: &str,
    env: &impl VariableLookup,
    target: Option<Target>,
    ast: bool,
) -> anyhow::Result<String> {
    let parsed = engine.parse(text)?;
    if ast {
        return Ok(parsed.to_string());
    }

    let rendered = render(engine, parsed.expression(), env, target)?;
    Ok(match &parsed {
        ParseResult::Assignment(assignment) => format!("{} = {}", assignment.variable, rendered),
        ParseResult::Expression(_) => rendered,
    })
}

fn render(
    engine: &EvaluationEngine,
    expr: &expr_runtime::Expr,
    env: &impl VariableLookup,
    target: Option<Target>,
) -> anyhow::Result<String> {
    let text = match target {
        None => engine
            .evaluate_expression_with::<Value, _>(expr, env)?
            .to_string(),
        Some(Target::Int) => engine
            .evaluate_expression_with::<i64, _>(expr, env)?
            .to_string(),
        Some(Target::Decimal) => engine
            .evaluate_expression_with::<Decimal, _>(expr, env)?
            .to_string(),
        Some(Target::String) => engine.evaluate_expression_with::<String, _>(expr, env)?,
        Some(Target::Bool) => engine
            .evaluate_expression_with::<bool, _>(expr, env)?
            .to_string(),
    };
    Ok(text)
}
