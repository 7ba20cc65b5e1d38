// 本地化消息格式化

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

pub const TOOL_INVOCATION_MESSAGE: &str = "toolInvocationMessage";

static CATALOGUES: Lazy<HashMap<&'static str, HashMap<&'static str, &'static str>>> =
    Lazy::new(|| {
        let mut catalogues = HashMap::new();
        catalogues.insert("en", HashMap::new());
        catalogues.insert(
            "zh-cn",
            HashMap::from([(TOOL_INVOCATION_MESSAGE, "正在使用 {0}")]),
        );
        catalogues
    });

/// 消息格式化器
///
/// 必须是纯函数且同步：相同的 key/参数总是得到相同的文本。
pub trait MessageFormatter: Send + Sync {
    fn format(&self, key: &str, default_message: &str, args: &[&str]) -> String;
}

/// 基于内置目录的格式化器，未知 key 或语言时回退到默认文本
#[derive(Clone, Debug)]
pub struct CatalogFormatter {
    locale: String,
}

impl CatalogFormatter {
    pub fn new(locale: impl Into<String>) -> Self {
        let locale = locale.into().to_lowercase();
        if !CATALOGUES.contains_key(locale.as_str()) {
            debug!(%locale, "no message catalogue for locale, using defaults");
        }
        Self { locale }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn supported_locales() -> Vec<&'static str> {
        let mut locales: Vec<_> = CATALOGUES.keys().copied().collect();
        locales.sort_unstable();
        locales
    }
}

impl Default for CatalogFormatter {
    fn default() -> Self {
        Self::new("en")
    }
}

impl MessageFormatter for CatalogFormatter {
    fn format(&self, key: &str, default_message: &str, args: &[&str]) -> String {
        let template = CATALOGUES
            .get(self.locale.as_str())
            .and_then(|catalogue| catalogue.get(key).copied())
            .unwrap_or(default_message);
        format_template(template, args)
    }
}

impl<F> MessageFormatter for F
where
    F: Fn(&str, &str, &[&str]) -> String + Send + Sync,
{
    fn format(&self, key: &str, default_message: &str, args: &[&str]) -> String {
        self(key, default_message, args)
    }
}

/// 替换 `{0}`、`{1}` 等占位符；越界的占位符保持原样。
pub fn format_template(template: &str, args: &[&str]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        output.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replaced = after.find('}').and_then(|end| {
            let index: usize = after[..end].parse().ok()?;
            args.get(index).map(|arg| (*arg, end))
        });
        match replaced {
            Some((arg, end)) => {
                output.push_str(arg);
                rest = &after[end + 1..];
            }
            None => {
                output.push('{');
                rest = after;
            }
        }
    }
    output.push_str(rest);
    output
}
