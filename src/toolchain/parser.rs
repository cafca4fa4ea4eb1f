//! 输出解析函数

use super::types::CrateListing;
use regex::Regex;
use std::sync::LazyLock;

/// `cargo search` 结果行：`<name> = "<version>"    # <description>`
static SEARCH_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?P<name>\S+)\s=\s"(?P<version>[0-9][0-9A-Za-z.+-]*)"(?:\s+#\s?(?P<description>.*))?$"#)
        .expect("search line pattern is valid")
});

/// 清理终端输出中的 ANSI 转义序列和特殊字符
pub fn clean_terminal_output(input: &str) -> String {
    let mut result = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    while let Some(&next) = chars.peek() {
                        chars.next();
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
            }
            '\r' => {
                if chars.peek() != Some(&'\n') && !result.ends_with('\n') {
                    result.push('\n');
                }
            }
            c if c.is_control() && c != '\n' && c != '\t' => {}
            _ => result.push(c),
        }
    }

    result
}

/// 解析 `rustc --print` 的输出：按行拆分，保持顺序，丢弃空行
pub fn parse_print_output(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// 解析 `cargo search` 的输出。
///
/// cargo 会把 `Updating crates.io index`、`... and N crates more` 之类的提示行
/// 混在结果里，不匹配的行直接丢弃。
pub fn parse_search_output(output: &str) -> Vec<CrateListing> {
    output
        .lines()
        .filter_map(|line| parse_search_line(line.trim_end()))
        .collect()
}

fn parse_search_line(line: &str) -> Option<CrateListing> {
    let caps = SEARCH_LINE.captures(line)?;
    let field = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    };
    Some(CrateListing {
        name: field("name"),
        version: field("version"),
        description: field("description"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_line_splits_into_three_fields() {
        let listing = parse_search_output(r#"serde = "1.0.152"    # A serialization framework"#);
        assert_eq!(
            listing,
            vec![CrateListing {
                name: "serde".to_string(),
                version: "1.0.152".to_string(),
                description: "A serialization framework".to_string(),
            }]
        );
    }

    #[test]
    fn informational_lines_are_dropped() {
        let output = "    Updating crates.io index\n\
                      serde_json = \"1.0.93\"    # A JSON serialization file format\n\
                      ... and 2341 crates more (use --limit N to see more)\n";
        let listing = parse_search_output(output);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name, "serde_json");

        assert!(parse_search_output("Updating crates.io index").is_empty());
    }

    #[test]
    fn description_keeps_punctuation_and_may_be_missing() {
        let output = "tokio = \"1.42.0\"    # An event-driven, non-blocking I/O platform.\n\
                      bare = \"0.1.0-alpha.2\"\n";
        let listing = parse_search_output(output);
        assert_eq!(listing[0].description, "An event-driven, non-blocking I/O platform.");
        assert_eq!(listing[1].version, "0.1.0-alpha.2");
        assert_eq!(listing[1].description, "");
    }

    #[test]
    fn print_output_keeps_order_and_skips_blanks() {
        let values = parse_print_output("x86_64-unknown-linux-gnu\r\n\naarch64-apple-darwin\n");
        assert_eq!(values, vec!["x86_64-unknown-linux-gnu", "aarch64-apple-darwin"]);
    }

    #[test]
    fn clean_strips_ansi_and_controls() {
        let raw = "\x1b[1m\x1b[32mProject Name\x1b[0m: \x07";
        assert_eq!(clean_terminal_output(raw), "Project Name: ");
    }
}
