//! GitHub 搜索客户端（用于查找 cargo-generate 模板仓库）

pub mod query;
pub mod types;

pub use query::{SearchQuery, SearchType};
pub use types::{Repository, RepositoryFile, SearchPage, User};

use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;

pub const API_BASE: &str = "https://api.github.com";

#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("GitHub 请求失败: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GitHub API 错误 ({status}): {body}")]
    Api { status: u16, body: String },
}

pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE.to_string(),
            token,
        }
    }

    /// 请求单页结果
    pub async fn search<T: DeserializeOwned>(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchPage<T>, GitHubError> {
        let endpoint = query.endpoint(&self.base_url);
        log::info!("GET {}", endpoint);

        let mut request = self
            .client
            .get(&endpoint)
            .header(USER_AGENT, concat!("rust-project-manager/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api { status, body });
        }

        let page: SearchPage<T> = response.json().await?;
        log::debug!(
            "第 {} 页: {} 条 (共 {}, incomplete={})",
            query.page.unwrap_or(1),
            page.items.len(),
            page.total_count,
            page.incomplete_results
        );
        Ok(page)
    }

    /// 从第 1 页开始逐页请求，直到结果完整
    pub async fn search_all<T: DeserializeOwned>(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<T>, GitHubError> {
        collect_pages(|page| {
            let query = query.clone().page(page);
            async move { self.search::<T>(&query).await }
        })
        .await
    }
}

/// 分页收集：上一页 `incomplete_results` 为 true 且已收集数量小于 `total_count` 时继续，
/// 遇到空页停止。结果按到达顺序追加。
pub async fn collect_pages<T, E, F, Fut>(mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<SearchPage<T>, E>>,
{
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let result = fetch(page).await?;
        if result.items.is_empty() {
            break;
        }
        let more = result.incomplete_results;
        let total = result.total_count;
        items.extend(result.items);

        if !more || items.len() as u64 >= total {
            break;
        }
        page += 1;
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn page(range: std::ops::Range<u32>, total: u64, incomplete: bool) -> SearchPage<u32> {
        SearchPage {
            total_count: total,
            incomplete_results: incomplete,
            items: range.collect(),
        }
    }

    #[tokio::test]
    async fn pagination_stops_when_total_is_reached() {
        let calls = RefCell::new(Vec::new());
        let items = collect_pages(|n| {
            calls.borrow_mut().push(n);
            let result = match n {
                1 => page(0..100, 150, true),
                2 => page(100..150, 150, true),
                _ => page(0..0, 150, false),
            };
            async move { Ok::<_, GitHubError>(result) }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 150);
        assert_eq!(items[149], 149);
        assert_eq!(*calls.borrow(), vec![1, 2]);
    }

    #[tokio::test]
    async fn complete_first_page_is_the_only_request() {
        let calls = RefCell::new(0);
        let items = collect_pages(|_| {
            *calls.borrow_mut() += 1;
            async { Ok::<_, GitHubError>(page(0..30, 500, false)) }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 30);
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn empty_page_ends_pagination() {
        let calls = RefCell::new(0);
        let items = collect_pages(|n| {
            *calls.borrow_mut() += 1;
            let result = if n == 1 { page(0..10, 100, true) } else { page(0..0, 100, true) };
            async move { Ok::<_, GitHubError>(result) }
        })
        .await
        .unwrap();

        assert_eq!(items.len(), 10);
        assert_eq!(*calls.borrow(), 2);
    }

    fn local_client(base: String, token: Option<&str>) -> GitHubClient {
        GitHubClient {
            client: Client::builder().no_proxy().build().unwrap(),
            base_url: base,
            token: token.map(str::to_string),
        }
    }

    /// 本地起一个只应答一次的 HTTP 服务，返回 (base_url, 收到的请求文本)
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (format!("http://{}", addr), handle)
    }

    #[tokio::test]
    async fn search_sends_token_and_decodes_page() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"total_count":1,"incomplete_results":false,"items":[{"id":9,"full_name":"a/b"}]}"#,
        )
        .await;

        let client = local_client(base, Some("secret"));
        let query = SearchQuery::new(SearchType::Repositories).topic("cargo-generate");
        let page: SearchPage<Repository> = client.search(&query).await.unwrap();
        assert_eq!(page.items[0].full_name, "a/b");

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /search/repositories?q=topic:cargo-generate "));
        assert!(request.contains("authorization: bearer secret"));
        assert!(request.contains("user-agent: rust-project-manager/"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let (base, server) = serve_once("403 Forbidden", r#"{"message":"rate limited"}"#).await;

        let client = local_client(base, None);
        let err = client
            .search::<Repository>(&SearchQuery::new(SearchType::Users))
            .await
            .unwrap_err();
        server.await.unwrap();

        match err {
            GitHubError::Api { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("rate limited"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
