//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_oj_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum OJSystemError {
            $($variant(String),)*
        }

        impl OJSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(OJSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(OJSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(OJSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl OJSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        OJSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_oj_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    FileOperation("E006", "File Operation Error"),
    Validation("E007", "Validation Error"),
    NotFound("E008", "Resource Not Found"),
    Serialization("E009", "Serialization Error"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
    QueueConnection("E014", "Queue Connection Error"),
    QueueOperation("E015", "Queue Operation Error"),
    DuplicateSubmission("E016", "Duplicate Submission"),
    InvalidStateTransition("E017", "Invalid State Transition"),
}

impl OJSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为重复提交（commit_tag 冲突）
    pub fn is_duplicate_submission(&self) -> bool {
        matches!(self, OJSystemError::DuplicateSubmission(_))
    }
}

impl fmt::Display for OJSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for OJSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for OJSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        OJSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<redis::RedisError> for OJSystemError {
    fn from(err: redis::RedisError) -> Self {
        OJSystemError::QueueOperation(err.to_string())
    }
}

impl From<std::io::Error> for OJSystemError {
    fn from(err: std::io::Error) -> Self {
        OJSystemError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for OJSystemError {
    fn from(err: serde_json::Error) -> Self {
        OJSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for OJSystemError {
    fn from(err: chrono::ParseError) -> Self {
        OJSystemError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OJSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(OJSystemError::cache_connection("test").code(), "E001");
        assert_eq!(OJSystemError::database_config("test").code(), "E003");
        assert_eq!(OJSystemError::validation("test").code(), "E007");
        assert_eq!(OJSystemError::authentication("test").code(), "E012");
        assert_eq!(OJSystemError::duplicate_submission("test").code(), "E016");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            OJSystemError::queue_operation("test").error_type(),
            "Queue Operation Error"
        );
        assert_eq!(
            OJSystemError::invalid_state_transition("test").error_type(),
            "Invalid State Transition"
        );
    }

    #[test]
    fn test_duplicate_is_distinct_from_database_error() {
        assert!(OJSystemError::duplicate_submission("abc").is_duplicate_submission());
        assert!(!OJSystemError::database_operation("abc").is_duplicate_submission());
    }

    #[test]
    fn test_format_simple() {
        let err = OJSystemError::validation("additional_data is not a list");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("additional_data is not a list"));
    }
}
