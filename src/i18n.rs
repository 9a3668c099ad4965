// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持葡萄牙语（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 注意: 请求路径显式传入 locale，不修改全局 locale
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// 判断语言是否可用
pub fn is_available(locale: &str) -> bool {
    rust_i18n::available_locales!().iter().any(|l| *l == locale)
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use bolt_agent::i18n::t;
/// let msg = t("pt-BR", "agent.not_found");
/// ```
pub fn t(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use bolt_agent::i18n::t_with_args;
/// let msg = t_with_args("pt-BR", "agent.no_sales", &[("code", "12345")]);
/// ```
pub fn t_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = t(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}
