//! GitHub 搜索 API 的响应类型（只保留用得到的字段）

use serde::Deserialize;

/// 一页搜索结果
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchPage<T> {
    pub total_count: u64,
    /// 为 true 时表示结果不完整，还有后续页
    pub incomplete_results: bool,
    pub items: Vec<T>,
}

impl<T> Default for SearchPage<T> {
    fn default() -> Self {
        Self {
            total_count: 0,
            incomplete_results: false,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    pub login: String,
    pub id: u64,
    pub html_url: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct License {
    pub key: String,
    pub name: String,
    pub spdx_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Option<User>,
    pub html_url: String,
    pub clone_url: String,
    pub description: Option<String>,
    pub default_branch: String,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub topics: Vec<String>,
    pub license: Option<License>,
    pub fork: bool,
    pub archived: bool,
}

impl Repository {
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepositoryFile {
    pub name: String,
    pub path: String,
    pub sha: String,
    pub html_url: String,
    pub repository: Repository,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_page_tolerates_missing_and_null_fields() {
        let json = r#"{
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                {
                    "id": 1,
                    "name": "rust-starter",
                    "full_name": "someone/rust-starter",
                    "owner": { "login": "someone", "id": 7, "type": "User" },
                    "html_url": "https://github.com/someone/rust-starter",
                    "clone_url": "https://github.com/someone/rust-starter.git",
                    "description": null,
                    "stargazers_count": 42,
                    "topics": ["cargo-generate"],
                    "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" }
                },
                { "id": 2, "name": "bare" }
            ]
        }"#;

        let page: SearchPage<Repository> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        let first = &page.items[0];
        assert_eq!(first.owner.as_ref().unwrap().kind, "User");
        assert_eq!(first.description_or_empty(), "");
        assert_eq!(first.license.as_ref().unwrap().spdx_id.as_deref(), Some("MIT"));
        assert_eq!(page.items[1].clone_url, "");
    }
}
