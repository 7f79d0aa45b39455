//! 传输状态码：沿用 HTTP 语义建模的结果分类。

use super::retry_policy::RetryPolicy;

/// 一次传输（或一个分片）的结果状态。
///
/// - `Success`（200）：整体成功
/// - `PieceSaved`（206）：内部哨兵，「分片已持久化」，不会作为最终结果对外返回
/// - `Timeout`（408）：超时 / 无响应哨兵（含传输中断、分片长度不符）
/// - `CorruptSource`（403）：校验确认源损坏，按设计停止重试
/// - `Protocol(n)`：连接器返回的其它协议状态码原样透传
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Success,
    PieceSaved,
    Timeout,
    CorruptSource,
    Protocol(u16),
}

impl TransferStatus {
    /// 对应的数字状态码。
    pub fn code(&self) -> u16 {
        match self {
            TransferStatus::Success => 200,
            TransferStatus::PieceSaved => 206,
            TransferStatus::Timeout => 408,
            TransferStatus::CorruptSource => 403,
            TransferStatus::Protocol(code) => *code,
        }
    }

    /// 从数字状态码还原；与 [`TransferStatus::code`] 互为往返。
    pub fn from_code(code: u16) -> Self {
        match code {
            200 => TransferStatus::Success,
            206 => TransferStatus::PieceSaved,
            408 => TransferStatus::Timeout,
            403 => TransferStatus::CorruptSource,
            other => TransferStatus::Protocol(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransferStatus::Success | TransferStatus::PieceSaved)
    }

    /// 是否属于可重试一类：超时哨兵，或在重试策略额外配置的状态码集合内。
    pub fn is_retryable(&self, policy: &RetryPolicy) -> bool {
        matches!(self, TransferStatus::Timeout)
            || policy.extra_retry_codes.contains(&self.code())
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
