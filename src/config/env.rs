use std::env;

pub const DEBUG_VAR: &str = "TOOLCALL_DEBUG";
pub const LOCALE_VAR: &str = "TOOLCALL_LOCALE";
pub const TRANSCRIPT_PREFIX_VAR: &str = "TOOLCALL_TRANSCRIPT_PREFIX";

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 获取可选的环境变量，空字符串视为未设置
    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// 检查是否启用调试模式
    pub fn is_debug_mode() -> bool {
        env::var(DEBUG_VAR).is_ok()
    }
}

/// 宏：简化可选环境变量获取
#[macro_export]
macro_rules! env_var {
    ($key:expr) => {
        $crate::config::EnvConfig::get_env_optional($key)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_unset() {
        env::set_var("TOOLCALL_TEST_BLANK", "   ");
        assert_eq!(EnvConfig::get_env_optional("TOOLCALL_TEST_BLANK"), None);
        env::remove_var("TOOLCALL_TEST_BLANK");
    }

    #[test]
    fn values_are_trimmed() {
        env::set_var("TOOLCALL_TEST_TRIM", " zh-cn ");
        assert_eq!(
            crate::env_var!("TOOLCALL_TEST_TRIM").as_deref(),
            Some("zh-cn")
        );
        env::remove_var("TOOLCALL_TEST_TRIM");
    }
}
