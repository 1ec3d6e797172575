//! 系统/终端明暗检测

use std::env;
use std::process::Command;

/// 检测当前应使用深色还是浅色配色
///
/// 返回 `true` 表示深色。优先看终端的 COLORFGBG 提示，
/// 其次在 macOS 上读系统外观设置，都拿不到时默认深色
/// （终端环境里深色背景远比浅色常见）。
pub fn detect_system_theme() -> bool {
    if let Some(dark) = colorfgbg_is_dark() {
        return dark;
    }
    if let Some(dark) = macos_interface_is_dark() {
        return dark;
    }
    true
}

/// COLORFGBG 形如 "15;0"，最后一段是背景色号，0-6 和 8 视为深色
fn colorfgbg_is_dark() -> Option<bool> {
    let value = env::var("COLORFGBG").ok()?;
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(bg <= 6 || bg == 8)
}

/// macOS 下 AppleInterfaceStyle 存在且为 "Dark" 即深色模式；
/// 键不存在时 defaults 以非零退出，表示浅色模式
fn macos_interface_is_dark() -> Option<bool> {
    if !cfg!(target_os = "macos") {
        return None;
    }
    let output = Command::new("defaults")
        .args(["read", "-g", "AppleInterfaceStyle"])
        .output()
        .ok()?;
    Some(
        output.status.success()
            && String::from_utf8_lossy(&output.stdout)
                .trim()
                .eq_ignore_ascii_case("dark"),
    )
}
