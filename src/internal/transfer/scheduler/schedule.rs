//! 分片调度入口：预创建输出文件，spawn 有界并发的分片任务并等待汇总。

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock};

use tokio::fs::OpenOptions;
use tokio::sync::Mutex;

use crate::internal::transfer::manifest::sidecar::Manifest;
use crate::internal::transfer::structs::piece_plan::PiecePlan;
use crate::internal::transfer::structs::piece_range::PieceRange;
use crate::internal::transfer::structs::transfer_error::TransferError;
use crate::internal::transfer::structs::transfer_hooks_container::TransferHooksContainer;
use crate::internal::transfer::structs::transfer_progress::ProgressProperty;
use crate::internal::transfer::structs::transfer_request::TransferRequest;
use crate::internal::transfer::structs::transfer_status::TransferStatus;
use crate::internal::transfer::traits::connector::Connector;

use super::spawn_tasks::{join_piece_handles, spawn_piece_tasks, SpawnPieceTasksParams};

/// 分片调度参数（形参超过 3 个，用 struct 承载）。
pub struct PieceSchedulerParams {
    pub connector: Arc<dyn Connector>,
    pub request: Arc<TransferRequest>,
    pub plan: PiecePlan,
    pub total: u64,
    /// 恢复时已完成的分片集合；新传输为空
    pub completed: HashSet<PieceRange>,
    pub output_path: PathBuf,
    pub manifest: Arc<Manifest>,
    pub progress: ProgressProperty,
    pub hooks: Arc<Mutex<TransferHooksContainer>>,
}

/// 运行一代分片池：一个分片一个任务，完成顺序任意（随机写保证正确性）；
/// 第一个耗尽重试的分片触发协作停机并决定整体结果。
pub async fn run_piece_scheduler(
    params: PieceSchedulerParams,
) -> Result<TransferStatus, TransferError> {
    // 预创建输出文件并设定长度；恢复时文件已存在，create(true) 不会截断
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(&params.output_path)
        .await
        .map_err(TransferError::CreateFile)?;
    file.set_len(params.total)
        .await
        .map_err(TransferError::WriteFile)?;
    drop(file);

    let abort = Arc::new(AtomicBool::new(false));
    let first_failure: Arc<OnceLock<TransferStatus>> = Arc::new(OnceLock::new());

    let handles = spawn_piece_tasks(SpawnPieceTasksParams {
        connector: params.connector,
        request: params.request,
        plan: params.plan,
        total: params.total,
        completed: Arc::new(params.completed),
        output_path: Arc::new(params.output_path),
        manifest: params.manifest,
        progress: params.progress,
        hooks: params.hooks,
        abort,
        first_failure: Arc::clone(&first_failure),
    });

    join_piece_handles(handles, &first_failure).await
}
