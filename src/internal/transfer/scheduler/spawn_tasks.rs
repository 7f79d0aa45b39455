//! 生成并 spawn 各分片任务，以及等待全部任务完成并汇总整体结果。

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinHandle;

use crate::internal::transfer::manifest::sidecar::Manifest;
use crate::internal::transfer::structs::piece_plan::PiecePlan;
use crate::internal::transfer::structs::piece_range::PieceRange;
use crate::internal::transfer::structs::transfer_error::TransferError;
use crate::internal::transfer::structs::transfer_hooks_container::TransferHooksContainer;
use crate::internal::transfer::structs::transfer_progress::ProgressProperty;
use crate::internal::transfer::structs::transfer_request::TransferRequest;
use crate::internal::transfer::structs::transfer_status::TransferStatus;
use crate::internal::transfer::traits::connector::Connector;

use super::piece_task::{run_piece_task, PieceTaskParams};

/// 单个分片任务句柄：(区间, JoinHandle)。
pub type PieceTaskHandle = (PieceRange, JoinHandle<Result<TransferStatus, TransferError>>);

/// 生成并 spawn 分片任务时的参数（形参超过 3 个，用 struct 承载）。
pub struct SpawnPieceTasksParams {
    pub connector: Arc<dyn Connector>,
    pub request: Arc<TransferRequest>,
    pub plan: PiecePlan,
    pub total: u64,
    pub completed: Arc<HashSet<PieceRange>>,
    pub output_path: Arc<PathBuf>,
    pub manifest: Arc<Manifest>,
    pub progress: ProgressProperty,
    pub hooks: Arc<Mutex<TransferHooksContainer>>,
    pub abort: Arc<AtomicBool>,
    pub first_failure: Arc<OnceLock<TransferStatus>>,
}

/// 为每个分片 spawn 一个任务；并发由信号量限制在
/// min(分片数, 最大线程数) 以内。
pub fn spawn_piece_tasks(params: SpawnPieceTasksParams) -> Vec<PieceTaskHandle> {
    let permits = params
        .plan
        .piece_count
        .min(params.request.max_threads)
        .max(1) as usize;
    let semaphore = Arc::new(Semaphore::new(permits));

    let mut handles = Vec::new();
    for index in 0..params.plan.piece_count {
        let range = params.plan.piece_range(params.total, index);
        let task_params = PieceTaskParams {
            connector: Arc::clone(&params.connector),
            request: Arc::clone(&params.request),
            range,
            output_path: Arc::clone(&params.output_path),
            manifest: Arc::clone(&params.manifest),
            completed: Arc::clone(&params.completed),
            progress: params.progress.clone(),
            hooks: Arc::clone(&params.hooks),
            abort: Arc::clone(&params.abort),
            first_failure: Arc::clone(&params.first_failure),
        };
        let sem = Arc::clone(&semaphore);
        let abort = Arc::clone(&params.abort);
        let handle = tokio::spawn(async move {
            let _permit = sem.acquire_owned().await.map_err(|_| {
                TransferError::SchedulerInternal("semaphore closed".into())
            })?;
            let result = run_piece_task(task_params).await;
            if result.is_err() {
                // 本地 I/O 致命错误同样触发协作停机
                abort.store(true, Ordering::Relaxed);
            }
            result
        });
        handles.push((range, handle));
    }
    handles
}

/// 等待全部分片任务返回（join 屏障），汇总整体结果：
/// 全部成功为 200；否则为第一个耗尽重试的分片状态。
pub async fn join_piece_handles(
    handles: Vec<PieceTaskHandle>,
    first_failure: &OnceLock<TransferStatus>,
) -> Result<TransferStatus, TransferError> {
    for (_range, handle) in handles {
        match handle.await {
            Ok(Ok(_piece_status)) => {}
            Ok(Err(e)) => return Err(e),
            Err(join_err) => return Err(TransferError::TaskJoin(join_err)),
        }
    }
    Ok(first_failure
        .get()
        .copied()
        .unwrap_or(TransferStatus::Success))
}
