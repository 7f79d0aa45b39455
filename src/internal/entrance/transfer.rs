//! 本库主入口：一步完成（或恢复）一次传输。
//!
//! 需要进度监听、钩子或自定义连接器时，直接使用
//! [`crate::transfer::TransferEngine`] 链式配置。

use std::sync::Arc;

use crate::internal::transfer::engine::TransferEngine;
use crate::internal::transfer::structs::transfer_error::TransferError;
use crate::internal::transfer::structs::transfer_request::TransferRequest;
use crate::internal::transfer::structs::transfer_status::TransferStatus;
use crate::internal::transfer::traits::connector::Connector;

/// 执行一次传输：探测、规划、并发取回、校验，成功后清理 sidecar。
/// 上次中断的传输会自动从清单恢复。
///
/// example:
/// ```rust,no_run
/// use resume_fetch::transfer::TransferRequest;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let request = TransferRequest::builder("https://example.com/big.bin", "./downloads")
///     .max_threads(8)
///     .build()?;
/// let status = resume_fetch::transfer_file(request).await?;
/// assert!(status.is_success());
/// # Ok(())
/// # }
/// ```
pub async fn transfer_file(request: TransferRequest) -> Result<TransferStatus, TransferError> {
    TransferEngine::new(request)?.send().await
}

/// 同 [`transfer_file`]，但注入自定义连接器（测试或替换底层 HTTP 实现）。
pub async fn transfer_file_with(
    connector: Arc<dyn Connector>,
    request: TransferRequest,
) -> Result<TransferStatus, TransferError> {
    TransferEngine::with_connector(request, connector).send().await
}
