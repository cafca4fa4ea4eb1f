use super::CommandSpec;
use crate::toolchain::types::RenderedCommand;

/// 在 registry 中按名称搜索 crate（`cargo search`）
#[derive(Debug, Clone, Default)]
pub struct SearchCrates {
    pub query: String,
    /// 结果数量上限（cargo 默认 10，最大 100）
    pub limit: Option<u32>,
    pub index: Option<String>,
    pub registry: Option<String>,
}

impl SearchCrates {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn registry(mut self, registry: Option<String>) -> Self {
        self.registry = registry;
        self
    }
}

impl CommandSpec for SearchCrates {
    fn render(&self) -> RenderedCommand {
        RenderedCommand::new("cargo")
            .arg("search")
            .opt_value("--limit", self.limit.map(|l| l.to_string()))
            .opt_value("--index", self.index.as_deref())
            .opt_value("--registry", self.registry.as_deref())
            .arg(self.query.as_str())
    }
}
