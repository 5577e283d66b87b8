//! # Config 模块
//!
//! 求值引擎配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高，由宿主处理）
//! 2. 配置文件 (JSON)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::syntax::parser::{DEFAULT_MAX_CHAIN_LENGTH, DEFAULT_MAX_DEPTH, ParseLimits};

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// `&&` / `||` 是否短路
    ///
    /// 默认关闭：两侧总是都会求值，未定义变量等错误不会被左侧结果掩盖。
    #[serde(default)]
    pub short_circuit_logic: bool,

    /// 括号 / 一元取负的最大嵌套层数
    ///
    /// 解析阶段超出返回 `ParseError::NestingTooDeep`，
    /// 对手工构建的树求值时超出返回 `EvalError::DepthLimitExceeded`。
    /// 同一层的运算符链不计入嵌套。
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// 同一优先级上连续运算符的最大个数，超出返回 `ParseError::ChainTooLong`
    #[serde(default = "default_max_chain_length")]
    pub max_chain_length: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            short_circuit_logic: false,
            max_depth: default_max_depth(),
            max_chain_length: default_max_chain_length(),
        }
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_chain_length() -> usize {
    DEFAULT_MAX_CHAIN_LENGTH
}

impl EngineConfig {
    /// 从 JSON 字符串解析配置
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 加载配置文件
    ///
    /// 文件不存在时返回默认配置；读取或解析失败时返回错误。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_json_str(&content)?;
        info!(path = %path.display(), "配置文件加载成功");
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_depth 必须大于 0".to_string(),
            ));
        }
        if self.max_chain_length == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_chain_length 必须大于 0".to_string(),
            ));
        }
        Ok(())
    }

    /// 解析阶段使用的限制
    pub fn parse_limits(&self) -> ParseLimits {
        ParseLimits {
            max_depth: self.max_depth,
            max_chain_length: self.max_chain_length,
        }
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 解析失败
    #[error("配置解析失败: {0}")]
    ParseFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
