use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 浏览器调试端口（连接已打开的浏览器）
    pub browser_debug_port: u16,
    /// 不连接现有浏览器，自己启动一个无头浏览器
    pub headless: bool,
    /// 无头模式下使用的浏览器可执行文件，留空则自动查找
    pub chrome_executable: Option<String>,
    /// 启动时打开或复用的页面
    pub start_url: String,
    /// 职位列表中相对链接的前缀
    pub job_base_url: String,
    /// 申请人配置文件
    pub profile_file: String,
    /// 职位列表文件
    pub jobs_file: String,
    /// 投递台账
    pub ledger_file: String,
    /// 简历文件（申请人配置中的 `[resume] path` 优先）
    pub resume_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 时间参数 ---
    /// 每次点击或跳转后的等待
    pub settle_delay_ms: u64,
    /// 查找元素的轮询间隔
    pub probe_poll_ms: u64,
    /// 查找 Apply / Send 等按钮的最长等待
    pub probe_timeout_secs: u64,
    /// 查找 Next 按钮的最长等待（找不到说明已经是最后一页）
    pub next_probe_timeout_secs: u64,
    /// 提交后等待结果提示的最长时间
    pub outcome_timeout_secs: u64,
    /// 必填字段检查的轮询间隔
    pub completion_poll_ms: u64,
    /// 必填字段检查的最长等待
    pub completion_max_wait_secs: u64,
    /// 单个职位最多经过的向导页数
    pub max_wizard_pages: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_debug_port: 9222,
            headless: false,
            chrome_executable: None,
            start_url: "about:blank".to_string(),
            job_base_url: "https://jobs.jobvite.com".to_string(),
            profile_file: "config/applicant.toml".to_string(),
            jobs_file: "config/jobs.toml".to_string(),
            ledger_file: "applied_jobs.toml".to_string(),
            resume_file: "resume/resume.txt".to_string(),
            verbose_logging: false,
            output_log_file: "system.log".to_string(),
            settle_delay_ms: 3000,
            probe_poll_ms: 250,
            probe_timeout_secs: 20,
            next_probe_timeout_secs: 5,
            outcome_timeout_secs: 20,
            completion_poll_ms: 5000,
            completion_max_wait_secs: 60,
            max_wizard_pages: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            browser_debug_port: std::env::var("BROWSER_DEBUG_PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.browser_debug_port),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok().filter(|v| !v.is_empty()).or(default.chrome_executable),
            start_url: std::env::var("START_URL").unwrap_or(default.start_url),
            job_base_url: std::env::var("JOB_BASE_URL").unwrap_or(default.job_base_url),
            profile_file: std::env::var("PROFILE_FILE").unwrap_or(default.profile_file),
            jobs_file: std::env::var("JOBS_FILE").unwrap_or(default.jobs_file),
            ledger_file: std::env::var("LEDGER_FILE").unwrap_or(default.ledger_file),
            resume_file: std::env::var("RESUME_FILE").unwrap_or(default.resume_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            settle_delay_ms: std::env::var("SETTLE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_delay_ms),
            probe_poll_ms: std::env::var("PROBE_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.probe_poll_ms),
            probe_timeout_secs: std::env::var("PROBE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.probe_timeout_secs),
            next_probe_timeout_secs: std::env::var("NEXT_PROBE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.next_probe_timeout_secs),
            outcome_timeout_secs: std::env::var("OUTCOME_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.outcome_timeout_secs),
            completion_poll_ms: std::env::var("COMPLETION_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.completion_poll_ms),
            completion_max_wait_secs: std::env::var("COMPLETION_MAX_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.completion_max_wait_secs),
            max_wizard_pages: std::env::var("MAX_WIZARD_PAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_wizard_pages),
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn probe_poll(&self) -> Duration {
        Duration::from_millis(self.probe_poll_ms)
    }

    pub fn completion_poll(&self) -> Duration {
        Duration::from_millis(self.completion_poll_ms)
    }
}
