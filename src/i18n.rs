// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库,文案位于 locales/*.yml
// 支持葡萄牙语（巴西,默认）和英文; 仅用于 CLI 摘要与提示
// 导入错误本身的文案固定为葡语（见 importer::error）
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言（"pt-BR" 或 "en",未知语言回退 pt-BR 文案）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译无参数消息,如 `cli.usage`
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译带参数消息,按 `%{name}` 占位符替换
///
/// # 示例
/// ```no_run
/// use client_import::i18n::t_with_args;
/// let msg = t_with_args(
///     "import.normalized",
///     &[("sheet", "Clientes"), ("rows", "120"), ("failed", "3")],
/// );
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(rust_i18n::t!(key).to_string(), |msg, (name, value)| {
        msg.replace(&format!("%{{{}}}", name), value)
    })
}
