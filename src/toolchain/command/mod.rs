//! 命令描述对象：把一组带类型的选项渲染成 cargo / rustc 的参数列表
//!
//! 渲染是纯函数，同一组选项渲染两次得到完全相同的 token 序列。

pub mod add;
pub mod generate;
pub mod new;
pub mod print;
pub mod search;

pub use add::AddCrate;
pub use generate::{GenerateProject, TemplateSource};
pub use new::NewCrate;
pub use print::{PrintOutput, RustcPrint};
pub use search::SearchCrates;

use super::types::RenderedCommand;
use std::fmt;
use std::str::FromStr;

/// 能把自己渲染成命令行的对象
pub trait CommandSpec {
    fn render(&self) -> RenderedCommand;
}

/// cargo new / generate 可用的模板
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrateTemplate {
    Bin,
    Lib,
}

impl CrateTemplate {
    pub fn flag(self) -> &'static str {
        match self {
            CrateTemplate::Bin => "--bin",
            CrateTemplate::Lib => "--lib",
        }
    }
}

/// cargo 能初始化的版本控制系统
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionControl {
    Git,
    Hg,
    Pijul,
    Fossil,
    None,
}

impl VersionControl {
    pub const ALL: [VersionControl; 5] = [
        VersionControl::Git,
        VersionControl::Hg,
        VersionControl::Pijul,
        VersionControl::Fossil,
        VersionControl::None,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VersionControl::Git => "git",
            VersionControl::Hg => "hg",
            VersionControl::Pijul => "pijul",
            VersionControl::Fossil => "fossil",
            VersionControl::None => "none",
        }
    }
}

impl fmt::Display for VersionControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionControl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionControl::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("未知的版本控制系统: {}", s))
    }
}

/// Rust edition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edition {
    E2015,
    E2018,
    E2021,
    E2024,
}

impl Edition {
    pub fn as_str(self) -> &'static str {
        match self {
            Edition::E2015 => "2015",
            Edition::E2018 => "2018",
            Edition::E2021 => "2021",
            Edition::E2024 => "2024",
        }
    }
}

impl FromStr for Edition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "2015" => Ok(Edition::E2015),
            "2018" => Ok(Edition::E2018),
            "2021" => Ok(Edition::E2021),
            "2024" => Ok(Edition::E2024),
            other => Err(format!("未知的 edition: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcs_round_trips_through_its_name() {
        assert_eq!("Git".parse::<VersionControl>(), Ok(VersionControl::Git));
        assert_eq!("none".parse::<VersionControl>(), Ok(VersionControl::None));
        assert!("svn".parse::<VersionControl>().is_err());
    }

    #[test]
    fn edition_parse_rejects_unknown_years() {
        assert_eq!("2021".parse::<Edition>(), Ok(Edition::E2021));
        assert!("2019".parse::<Edition>().is_err());
    }
}
