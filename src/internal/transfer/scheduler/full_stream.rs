//! Full 方式：不切分，把探测时已拿到的单个响应流整体写入输出文件。

use std::path::PathBuf;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::internal::transfer::structs::transfer_error::TransferError;
use crate::internal::transfer::structs::transfer_hooks_container::TransferHooksContainer;
use crate::internal::transfer::structs::transfer_progress::{ProgressProperty, TransferProgress};
use crate::internal::transfer::structs::transfer_status::TransferStatus;
use crate::internal::transfer::traits::connector::BodyStream;
use tokio::sync::Mutex;

/// 单流下载参数（形参超过 3 个，用 struct 承载）。
pub struct FullStreamParams {
    /// 探测请求的响应体（或恢复时新发起的普通 GET 响应体）
    pub body: BodyStream,
    pub output_path: PathBuf,
    /// 已知的资源大小；未知时不做长度核对
    pub total: Option<u64>,
    pub progress: ProgressProperty,
    pub hooks: Arc<Mutex<TransferHooksContainer>>,
}

/// 整流写盘：流式落盘并更新进度；传输中断或长度不符按超时类失败返回。
pub async fn run_full_stream(
    params: FullStreamParams,
) -> Result<TransferStatus, TransferError> {
    let mut file = File::create(&params.output_path)
        .await
        .map_err(TransferError::CreateFile)?;

    let mut stream = params.body;
    let mut bytes_done: u64 = 0;
    while let Some(chunk_result) = stream.next().await {
        let chunk = match chunk_result {
            Ok(c) => c,
            Err(_) => return Ok(TransferStatus::Timeout),
        };
        file.write_all(&chunk)
            .await
            .map_err(TransferError::WriteFile)?;
        bytes_done += chunk.len() as u64;

        params.progress.update(TransferProgress {
            bytes_done,
            total: params.total,
        });
        params
            .hooks
            .lock()
            .await
            .run_on_progress(bytes_done, params.total);
    }

    // 已知大小时核对字节数，不符视作传输中断
    if let Some(total) = params.total {
        if total > 0 && bytes_done != total {
            return Ok(TransferStatus::Timeout);
        }
    }

    file.flush().await.map_err(TransferError::WriteFile)?;
    Ok(TransferStatus::Success)
}
