//! 单个分片的取回与落盘：Range 请求、按偏移随机写、长度核对、重试循环。

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use futures_util::StreamExt;
use tokio::fs::OpenOptions;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::internal::transfer::manifest::sidecar::Manifest;
use crate::internal::transfer::structs::piece_range::PieceRange;
use crate::internal::transfer::structs::transfer_error::TransferError;
use crate::internal::transfer::structs::transfer_hooks_container::TransferHooksContainer;
use crate::internal::transfer::structs::transfer_progress::ProgressProperty;
use crate::internal::transfer::structs::transfer_request::TransferRequest;
use crate::internal::transfer::structs::transfer_status::TransferStatus;
use crate::internal::transfer::traits::connector::{Connector, ExchangeParams};

/// 分片任务参数（形参超过 3 个，用 struct 承载）。
pub struct PieceTaskParams {
    pub connector: Arc<dyn Connector>,
    pub request: Arc<TransferRequest>,
    pub range: PieceRange,
    pub output_path: Arc<PathBuf>,
    pub manifest: Arc<Manifest>,
    /// 恢复时从清单读出的已完成分片集合
    pub completed: Arc<HashSet<PieceRange>>,
    pub progress: ProgressProperty,
    pub hooks: Arc<Mutex<TransferHooksContainer>>,
    /// 协作停机标志：置位后未开始的分片不再发请求
    pub abort: Arc<AtomicBool>,
    /// 第一个耗尽重试的分片把自己的状态写进来，成为整体结果
    pub first_failure: Arc<OnceLock<TransferStatus>>,
}

/// 执行一个分片：命中已完成集合直接 206 短路；否则 Range 请求 + 随机写 +
/// 长度核对，可重试类失败按策略重试，耗尽后触发协作停机。
pub async fn run_piece_task(params: PieceTaskParams) -> Result<TransferStatus, TransferError> {
    // 恢复快路径：该分片已有持久化记录，不发任何网络请求
    if params.completed.contains(&params.range) {
        params.progress.add_bytes(params.range.len());
        let current = params.progress.get_current();
        params
            .hooks
            .lock()
            .await
            .run_on_progress(current.bytes_done, current.total);
        return Ok(TransferStatus::PieceSaved);
    }

    let mut attempt: usize = 0;
    loop {
        if params.abort.load(Ordering::Relaxed) {
            // 池已停机：不再发请求，结果由触发停机的分片决定
            return Ok(TransferStatus::Timeout);
        }

        match try_fetch_piece(&params).await? {
            None => {
                // 字节数核对一致且已落盘，此刻才算「完成」
                params.manifest.record_piece(&params.range).await?;
                params.progress.add_bytes(params.range.len());
                let current = params.progress.get_current();
                let mut hooks = params.hooks.lock().await;
                hooks.run_on_piece_done(&params.range);
                hooks.run_on_progress(current.bytes_done, current.total);
                return Ok(TransferStatus::PieceSaved);
            }
            Some(status) => {
                if status.is_retryable(&params.request.retry)
                    && params.request.retry.allows_another_attempt(attempt)
                {
                    attempt += 1;
                    tokio::time::sleep(std::time::Duration::from_millis(
                        params.request.retry.retry_delay_ms,
                    ))
                    .await;
                    continue;
                }

                // 重试耗尽：触发协作停机，本分片的状态成为整体结果
                let _ = params.first_failure.set(status);
                params.abort.store(true, Ordering::Relaxed);
                return Ok(status);
            }
        }
    }
}

/// 一次取回尝试。`Ok(None)` 表示成功落盘；`Ok(Some(status))` 表示本次失败
/// （可能可重试）；`Err` 是本地 I/O 致命错误。
async fn try_fetch_piece(
    params: &PieceTaskParams,
) -> Result<Option<TransferStatus>, TransferError> {
    // Mandatory 方式在小文件上可能产生非法区间，按超时类失败处理
    if params.range.end < params.range.start {
        return Ok(Some(TransferStatus::Timeout));
    }

    let reply = params
        .connector
        .exchange(ExchangeParams {
            url: &params.request.url,
            headers: &params.request.headers,
            cookies: &params.request.cookies,
            range: Some(params.range),
        })
        .await;

    if !(200..300).contains(&reply.status) {
        return Ok(Some(TransferStatus::from_code(reply.status)));
    }

    let expected = params.range.len();

    // 各分片写的区间互不相交，输出文件本身无需互斥，各任务独立持句柄随机写
    let mut file = OpenOptions::new()
        .write(true)
        .open(params.output_path.as_ref())
        .await
        .map_err(TransferError::CreateFile)?;
    file.seek(std::io::SeekFrom::Start(params.range.start))
        .await
        .map_err(TransferError::WriteFile)?;

    let mut stream = reply.body;
    let mut received: u64 = 0;
    let mut overrun = false;
    while let Some(chunk_result) = stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            // 传输中断按超时类失败，不记录、可重试
            Err(_) => return Ok(Some(TransferStatus::Timeout)),
        };
        let len = chunk.len() as u64;

        if received + len > expected {
            // 响应体超长：越界部分不能写（会覆盖相邻分片），整体按超时类失败
            let keep = (expected - received) as usize;
            if keep > 0 {
                file.write_all(&chunk[..keep])
                    .await
                    .map_err(TransferError::WriteFile)?;
            }
            received += len;
            overrun = true;
            break;
        }

        file.write_all(&chunk)
            .await
            .map_err(TransferError::WriteFile)?;
        received += len;
    }

    if overrun || received != expected {
        return Ok(Some(TransferStatus::Timeout));
    }

    file.flush().await.map_err(TransferError::WriteFile)?;
    Ok(None)
}
