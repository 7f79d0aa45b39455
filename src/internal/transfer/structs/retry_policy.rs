//! 分片重试策略：次数、间隔、无限重试开关与额外可重试状态码。

/// 默认重试次数
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// 默认重试间隔（毫秒）
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// 单个分片的重试策略。只作用于可重试类失败（超时哨兵或额外配置的状态码），
/// 致命错误不走重试。
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 每个分片失败后最多重试的次数（`unlimited` 为 true 时忽略）
    pub max_retries: usize,
    /// 两次尝试之间的等待（毫秒）
    pub retry_delay_ms: u64,
    /// 无限重试：分片层面不设次数上限；校验失败后的整体重试也由它控制
    pub unlimited: bool,
    /// 额外视为可重试的协议状态码（默认只有 408 超时哨兵可重试）
    pub extra_retry_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            unlimited: false,
            extra_retry_codes: Vec::new(),
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次失败（从 0 计）之后是否还应再试一次。
    pub fn allows_another_attempt(&self, attempt: usize) -> bool {
        self.unlimited || attempt < self.max_retries
    }
}
