//! 界面配色：Rust 橙为强调色，cargo 输出的绿色标记名称

use ratatui::style::Color;

/// 铁锈橙（边框、前缀、选中标记）
pub const RUST: Color = Color::Rgb(222, 165, 132);
/// cargo 绿（crate / 模板名、版本等值）
pub const CARGO_GREEN: Color = Color::Rgb(134, 200, 120);
/// 选中行背景色，偏暖的深褐
pub const SEL_BG: Color = Color::Rgb(52, 40, 34);
pub const BRIGHT_WHITE: Color = Color::Rgb(255, 255, 255);
/// 次要信息
pub const DIM: Color = Color::Rgb(130, 130, 140);
/// 选中行内的描述文字
pub const DESC_DIM: Color = Color::Rgb(190, 180, 172);
