//! 搜索请求的 URL 构造

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Code,
    Commits,
    Issues,
    Labels,
    Repositories,
    Topics,
    Users,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Code => "code",
            SearchType::Commits => "commits",
            SearchType::Issues => "issues",
            SearchType::Labels => "labels",
            SearchType::Repositories => "repositories",
            SearchType::Topics => "topics",
            SearchType::Users => "users",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(SearchType::Code),
            "commits" => Ok(SearchType::Commits),
            "issues" => Ok(SearchType::Issues),
            "labels" => Ok(SearchType::Labels),
            "repositories" | "repos" => Ok(SearchType::Repositories),
            "topics" => Ok(SearchType::Topics),
            "users" => Ok(SearchType::Users),
            other => Err(format!("未知的搜索类型: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// 一次 GitHub 搜索的全部条件
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub kind: SearchType,
    pub terms: Vec<String>,
    pub user: Option<String>,
    pub org: Option<String>,
    /// `OWNER/REPO`
    pub repo: Option<String>,
    pub filename: Option<String>,
    pub topics: Vec<String>,
    pub languages: Vec<String>,
    /// 排序字段，未设置时按最佳匹配；`order` 仅在设置了它时生效
    pub sort: Option<String>,
    pub order: Option<Order>,
    pub page: Option<u32>,
    /// 每页数量（最大 100，GitHub 默认 30）
    pub per_page: Option<u32>,
}

impl SearchQuery {
    pub fn new(kind: SearchType) -> Self {
        Self {
            kind,
            terms: Vec::new(),
            user: None,
            org: None,
            repo: None,
            filename: None,
            topics: Vec::new(),
            languages: Vec::new(),
            sort: None,
            order: None,
            page: None,
            per_page: None,
        }
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.terms.push(term.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topics.push(topic.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// `q` 参数：各部分分别编码后用 `+` 连接
    fn qualifiers(&self) -> Vec<String> {
        let mut q: Vec<String> = self
            .terms
            .iter()
            .map(|t| urlencoding::encode(t).into_owned())
            .collect();

        let singles = [
            ("user", &self.user),
            ("org", &self.org),
            ("repo", &self.repo),
            ("filename", &self.filename),
        ];
        for (name, value) in singles {
            if let Some(value) = value {
                q.push(format!("{}:{}", name, urlencoding::encode(value)));
            }
        }
        for topic in &self.topics {
            q.push(format!("topic:{}", urlencoding::encode(topic)));
        }
        for language in &self.languages {
            q.push(format!("language:{}", urlencoding::encode(language)));
        }
        q
    }

    pub fn endpoint(&self, base: &str) -> String {
        let mut endpoint = format!("{}/search/{}", base.trim_end_matches('/'), self.kind);

        let mut params = Vec::new();
        let q = self.qualifiers();
        if !q.is_empty() {
            params.push(format!("q={}", q.join("+")));
        }
        if let Some(sort) = &self.sort {
            params.push(format!("sort={}", urlencoding::encode(sort)));
        }
        if let Some(order) = self.order {
            params.push(format!("order={}", order.as_str()));
        }
        if let Some(page) = self.page {
            params.push(format!("page={}", page));
        }
        if let Some(per_page) = self.per_page {
            params.push(format!("per_page={}", per_page));
        }

        if !params.is_empty() {
            endpoint.push('?');
            endpoint.push_str(&params.join("&"));
        }
        endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://api.github.com";

    #[test]
    fn bare_query_has_no_parameters() {
        assert_eq!(
            SearchQuery::new(SearchType::Users).endpoint(BASE),
            "https://api.github.com/search/users"
        );
    }

    #[test]
    fn qualifiers_follow_fixed_order() {
        let mut query = SearchQuery::new(SearchType::Code)
            .term("fn main")
            .language("rust")
            .topic("cli")
            .user("octocat");
        query.filename = Some("main.rs".to_string());
        query.repo = Some("octocat/hello".to_string());

        assert_eq!(
            query.endpoint(BASE),
            "https://api.github.com/search/code?q=fn%20main+user:octocat+repo:octocat%2Fhello+filename:main.rs+topic:cli+language:rust"
        );
    }

    #[test]
    fn template_search_with_paging() {
        let mut query = SearchQuery::new(SearchType::Repositories)
            .topic("cargo-generate")
            .per_page(30)
            .page(2);
        query.sort = Some("stars".to_string());
        query.order = Some(Order::Desc);

        assert_eq!(
            query.endpoint("https://example.test/"),
            "https://example.test/search/repositories?q=topic:cargo-generate&sort=stars&order=desc&page=2&per_page=30"
        );
    }

    #[test]
    fn search_type_parses_short_alias() {
        assert_eq!("repos".parse::<SearchType>(), Ok(SearchType::Repositories));
        assert!("gists".parse::<SearchType>().is_err());
    }
}
