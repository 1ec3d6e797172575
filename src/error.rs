//! Taskdeck 统一错误类型定义
//!
//! 使用 `thiserror` 库提供统一的错误处理，支持错误链式传播。

use std::io;
use thiserror::Error;

/// Taskdeck 错误类型
#[derive(Debug, Error)]
pub enum TaskError {
    /// I/O 错误（配置读写等）
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 输入校验错误（进入网络调用之前拦截）
    #[error("Validation error: {0}")]
    Validation(String),

    /// Store 操作错误（create/update/delete 被后端拒绝）
    #[error("Store error: {0}")]
    Store(String),

    /// 连接错误（endpoint 不可达、握手失败）
    #[error("Connection error: {0}")]
    Connection(String),

    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),

    /// 资源不存在
    #[error("Not found: {0}")]
    NotFound(String),

    /// TOML 解析错误
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// JSON 解析错误
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Taskdeck Result 类型别名
pub type Result<T> = std::result::Result<T, TaskError>;

impl TaskError {
    /// 创建 Validation 错误
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// 创建 Store 错误
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// 创建 Connection 错误
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// 创建 Config 错误
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// 创建 NotFound 错误
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// 面向用户的简短消息（toast 显示用，不带类型前缀）
    pub fn user_message(&self) -> String {
        match self {
            TaskError::Validation(msg)
            | TaskError::Store(msg)
            | TaskError::Connection(msg)
            | TaskError::Config(msg)
            | TaskError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaskError::store("permission denied");
        assert_eq!(err.to_string(), "Store error: permission denied");

        let err = TaskError::validation("name is required");
        assert_eq!(err.to_string(), "Validation error: name is required");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let task_err: TaskError = io_err.into();
        assert!(matches!(task_err, TaskError::Io(_)));
    }

    #[test]
    fn test_user_message_strips_prefix() {
        let err = TaskError::store("backend unavailable");
        assert_eq!(err.user_message(), "backend unavailable");
    }
}
