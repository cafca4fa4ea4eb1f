use super::input::InputBox;
use crate::cargo_config::CargoConfig;
use crate::config::Config;
use crate::github::Repository;
use crate::targets;
use crate::toolchain::{CrateListing, CrateTemplate, RunError, Toolchain, ToolchainInfo, VersionControl};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// 提示在 footer 停留的时间
const NOTICE_TTL: Duration = Duration::from_secs(6);

// ========== 枚举 ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Dashboard,
    AddCrate, // a: cargo search + cargo add
    Target,   // t: .cargo/config.toml build.target
    NewCrate, // b / l: cargo init
    Generate, // g: cargo generate
}

/// 命令面板上的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteAction {
    AddCrate,
    SetTarget,
    NewBin,
    NewLib,
    Generate,
}

impl PaletteAction {
    pub const ALL: [PaletteAction; 5] = [
        PaletteAction::AddCrate,
        PaletteAction::SetTarget,
        PaletteAction::NewBin,
        PaletteAction::NewLib,
        PaletteAction::Generate,
    ];

    pub fn key(self) -> char {
        match self {
            PaletteAction::AddCrate => 'a',
            PaletteAction::SetTarget => 't',
            PaletteAction::NewBin => 'b',
            PaletteAction::NewLib => 'l',
            PaletteAction::Generate => 'g',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PaletteAction::AddCrate => "添加依赖 (cargo add)",
            PaletteAction::SetTarget => "设置编译目标",
            PaletteAction::NewBin => "初始化二进制包 (cargo init --bin)",
            PaletteAction::NewLib => "初始化库 (cargo init --lib)",
            PaletteAction::Generate => "从模板生成 (cargo generate)",
        }
    }

    pub fn from_key(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.key() == c)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratePhase {
    /// 搜索模板仓库
    Search,
    /// 输入项目名
    Name,
    Running,
    Done,
}

// ========== 事件 ==========

#[derive(Debug)]
pub enum AppEvent {
    ToolchainDetected(ToolchainInfo),
    CrateSearchResults(Vec<CrateListing>),
    TargetsLoaded(Vec<String>),
    TemplateResults(Vec<Repository>),
    GenerateLine(String),
    /// 模板提问，答案通过 reply 送回子进程
    Question {
        text: String,
        reply: oneshot::Sender<Result<String, RunError>>,
    },
    GenerateFinished {
        success: bool,
        message: String,
    },
    /// 动作成功完成，回到面板
    ActionDone(String),
    Error(String),
}

// ========== 子状态结构体 ==========

/// footer 上的一次性提示
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub error: bool,
    pub at: DateTime<Local>,
    shown: Instant,
}

impl Notice {
    pub fn new(text: impl Into<String>, error: bool) -> Self {
        Self {
            text: text.into(),
            error,
            at: Local::now(),
            shown: Instant::now(),
        }
    }

    pub fn expired(&self) -> bool {
        self.shown.elapsed() >= NOTICE_TTL
    }
}

#[derive(Default)]
pub struct AddCrateState {
    pub input: InputBox,
    pub results: Vec<CrateListing>,
    pub selected: usize,
    pub searching: bool,
    /// 防抖：最后一次按键的时间，稳定 debounce_ms 后才真正搜索
    pub search_scheduled: Option<Instant>,
    pub running: bool,
}

#[derive(Default)]
pub struct TargetState {
    pub filter: InputBox,
    pub targets: Vec<String>,
    pub selected: usize,
    pub loading: bool,
}

impl TargetState {
    /// 按过滤词筛选后的目标
    pub fn visible(&self) -> Vec<&str> {
        let needle = self.filter.content().trim().to_lowercase();
        self.targets
            .iter()
            .map(String::as_str)
            .filter(|t| {
                needle.is_empty()
                    || t.to_lowercase().contains(&needle)
                    || targets::summary(t).to_lowercase().contains(&needle)
            })
            .collect()
    }
}

pub struct NewCrateState {
    pub template: CrateTemplate,
    /// VersionControl::ALL 中的下标
    pub selected: usize,
    pub running: bool,
}

impl NewCrateState {
    pub fn new(template: CrateTemplate, default_vcs: VersionControl) -> Self {
        Self {
            template,
            selected: VersionControl::ALL
                .iter()
                .position(|v| *v == default_vcs)
                .unwrap_or(0),
            running: false,
        }
    }

    pub fn vcs(&self) -> VersionControl {
        VersionControl::ALL[self.selected.min(VersionControl::ALL.len() - 1)]
    }
}

/// 等待用户回答的模板提问
pub struct PendingQuestion {
    pub text: String,
    pub answer: InputBox,
    reply: Option<oneshot::Sender<Result<String, RunError>>>,
}

impl PendingQuestion {
    pub fn new(text: String, reply: oneshot::Sender<Result<String, RunError>>) -> Self {
        Self {
            text,
            answer: InputBox::new(),
            reply: Some(reply),
        }
    }

    pub fn submit(mut self) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Ok(self.answer.content().to_string()));
        }
    }

    pub fn cancel(mut self) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(Err(RunError::UserCancelled));
        }
    }
}

pub struct GenerateState {
    pub phase: GeneratePhase,
    pub input: InputBox,
    pub results: Vec<Repository>,
    pub selected: usize,
    pub searching: bool,
    pub search_scheduled: Option<Instant>,
    pub name: InputBox,
    pub lines: Vec<String>,
    pub scroll: usize,
    pub question: Option<PendingQuestion>,
    /// 进入命名阶段时确定的模板，之后到达的搜索结果不会替换它
    pub chosen: Option<Repository>,
    pub task: Option<JoinHandle<()>>,
    pub cancel_tx: Option<oneshot::Sender<()>>,
}

impl Default for GenerateState {
    fn default() -> Self {
        Self {
            phase: GeneratePhase::Search,
            input: InputBox::new(),
            results: Vec::new(),
            selected: 0,
            searching: false,
            search_scheduled: None,
            name: InputBox::new(),
            lines: Vec::new(),
            scroll: 0,
            question: None,
            chosen: None,
            task: None,
            cancel_tx: None,
        }
    }
}

impl GenerateState {
    pub fn selected_repo(&self) -> Option<&Repository> {
        self.results.get(self.selected)
    }

    /// 追加日志行并自动滚到底
    pub fn add_line(&mut self, line: String) {
        self.lines.push(line);
        self.scroll = self.lines.len().saturating_sub(1);
    }

    /// 确认当前选中的模板，停止后续搜索
    pub fn choose_selected(&mut self) -> bool {
        let Some(repo) = self.selected_repo().cloned() else {
            return false;
        };
        self.chosen = Some(repo);
        self.search_scheduled = None;
        self.searching = false;
        self.phase = GeneratePhase::Name;
        true
    }

    /// 取消进行中的生成：拒绝未回答的提问并通知子进程终止。
    /// 任务本身继续运行到子进程组被杀掉为止。
    pub fn cancel(&mut self) {
        if let Some(question) = self.question.take() {
            question.cancel();
        }
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
    }
}

// ========== App ==========

pub struct App {
    pub mode: AppMode,
    pub config: Config,
    pub workspace: PathBuf,
    pub toolchain: Toolchain,
    pub info: Option<ToolchainInfo>,
    pub build_target: Option<String>,
    pub palette_selected: usize,
    pub add: AddCrateState,
    pub target: TargetState,
    pub new_crate: NewCrateState,
    pub generate: GenerateState,
    pub notice: Option<Notice>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, workspace: PathBuf) -> Self {
        let toolchain = config.toolchain();
        let default_vcs = crate::actions::default_vcs(&config).unwrap_or(VersionControl::Git);
        let mut app = Self {
            mode: AppMode::Dashboard,
            config,
            workspace,
            toolchain,
            info: None,
            build_target: None,
            palette_selected: 0,
            add: AddCrateState::default(),
            target: TargetState::default(),
            new_crate: NewCrateState::new(CrateTemplate::Bin, default_vcs),
            generate: GenerateState::default(),
            notice: None,
            should_quit: false,
        };
        app.refresh_build_target();
        app
    }

    /// 读取工作区当前的 build.target（不创建文件）
    pub fn refresh_build_target(&mut self) {
        self.build_target = CargoConfig::current_build_target(&self.workspace);
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice::new(text, false));
    }

    pub fn fail(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::warn!("{}", text);
        self.notice = Some(Notice::new(text, true));
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.config.debounce_ms)
    }

    pub fn back_to_dashboard(&mut self) {
        self.mode = AppMode::Dashboard;
    }

    pub fn reset_add_state(&mut self) {
        self.add = AddCrateState::default();
    }

    pub fn reset_target_state(&mut self) {
        self.target = TargetState::default();
    }

    pub fn reset_new_crate_state(&mut self, template: CrateTemplate) {
        let default_vcs = crate::actions::default_vcs(&self.config).unwrap_or(VersionControl::Git);
        self.new_crate = NewCrateState::new(template, default_vcs);
    }

    pub fn reset_generate_state(&mut self) {
        self.generate.cancel();
        self.generate = GenerateState::default();
    }
}
