//! 传输引擎：把探测、规划、清单、分片调度与校验串成一台状态机。
//!
//! ```text
//! INIT → PROBE → PLAN →（sidecar 存在则 RESUME_LOAD）→ SCHEDULE → VERIFY
//!      → { DONE | RESET_AND_RETRY → SCHEDULE | FAILED }
//! ```
//!
//! 恢复路径不发探测请求，身份信息直接来自清单头；重置重试循环在传输层面
//! 单线程推进，同一时刻只有一代分片池在跑。
//!
//! 使用示例：
//!
//! ```rust,no_run
//! # use resume_fetch::transfer::{TransferRequest, TransferEngine};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = TransferRequest::builder("https://example.com/big.bin", "/tmp/downloads")
//!     .max_threads(8)
//!     .piece_size(1024 * 1024)
//!     .expected_hash("9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")
//!     .build()?;
//!
//! let engine = TransferEngine::new(request)?;
//! let progress = engine.progress();
//! let status = engine.send().await?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::Mutex;

use super::connector::reqwest_connector::ReqwestConnector;
use super::manifest::header::ManifestHeader;
use super::manifest::sidecar::Manifest;
use super::prober::file_name::{check_file_name, sanitize_file_name};
use super::prober::probe::probe;
use super::scheduler::full_stream::{run_full_stream, FullStreamParams};
use super::scheduler::schedule::{run_piece_scheduler, PieceSchedulerParams};
use super::structs::hook_adapters::{
    AfterCompleteHookAdapter, BeforeStartHookAdapter, OnPieceDoneHookAdapter,
    OnProgressHookAdapter,
};
use super::structs::piece_plan::{plan, plan_resume, PiecePlan};
use super::structs::piece_range::PieceRange;
use super::structs::transfer_error::TransferError;
use super::structs::transfer_hooks_container::TransferHooksContainer;
use super::structs::transfer_method::TransferMethod;
use super::structs::transfer_progress::{ProgressProperty, TransferProgress};
use super::structs::transfer_request::TransferRequest;
use super::structs::transfer_status::TransferStatus;
use super::traits::connector::{BodyStream, Connector, ExchangeParams};
use super::traits::hook::{HookAbort, TransferHook};
use super::verifier::verify_output;

/// 探测与 URL 都给不出文件名时的兜底名。
const FALLBACK_FILE_NAME: &str = "download";

/// 致命错误折算成状态码返回时使用的码（error_exit 关闭时）。
const FATAL_STATUS_CODE: u16 = 500;

/// 传输引擎。一次性使用：`send()` 消费自身，跑完整个状态机。
///
/// 不实现 Clone：引擎一旦开始传输就不应存在第二份，否则会有两代分片池
/// 同时写同一个输出文件。
pub struct TransferEngine {
    request: Arc<TransferRequest>,
    connector: Arc<dyn Connector>,
    hooks: TransferHooksContainer,
    progress: ProgressProperty,
}

impl TransferEngine {
    /// 用内置的 reqwest 连接器创建引擎（按请求里的代理 / Cookie 配置构建客户端）。
    pub fn new(request: TransferRequest) -> Result<Self, TransferError> {
        let connector = Arc::new(ReqwestConnector::from_request(&request)?);
        Ok(Self::with_connector(request, connector))
    }

    /// 注入自定义连接器（测试注入模拟实现，或换底层 HTTP 库）。
    pub fn with_connector(request: TransferRequest, connector: Arc<dyn Connector>) -> Self {
        Self {
            request: Arc::new(request),
            connector,
            hooks: TransferHooksContainer::default(),
            progress: ProgressProperty::default(),
        }
    }

    /// 内置的进度状态；返回可共享句柄，`.watch()` 后 `changed().await` 监听。
    pub fn progress(&self) -> ProgressProperty {
        self.progress.clone()
    }

    /// 添加完整钩子，在传输各阶段插入逻辑。
    pub fn with_hook(mut self, hook: impl TransferHook + 'static) -> Self {
        self.hooks.add(hook);
        self
    }

    /// 注册「开始前」钩子；闭包返回 `Err(HookAbort)` 会中止本次传输。
    pub fn with_before_start_hook<F, Fut>(mut self, f: F) -> Self
    where
        F: FnMut() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookAbort>> + Send + 'static,
    {
        self.hooks.add(BeforeStartHookAdapter(f));
        self
    }

    /// 注册「分片完成」钩子；参数为刚持久化的分片区间。
    pub fn with_on_piece_hook<F>(mut self, f: F) -> Self
    where
        F: FnMut(&PieceRange) + Send + Sync + 'static,
    {
        self.hooks.add(OnPieceDoneHookAdapter(f));
        self
    }

    /// 注册「进度」钩子；参数为已落盘字节数、总大小（可能未知为 `None`）。
    pub fn with_on_progress_hook<F>(mut self, f: F) -> Self
    where
        F: FnMut(u64, Option<u64>) + Send + Sync + 'static,
    {
        self.hooks.add(OnProgressHookAdapter(f));
        self
    }

    /// 注册「完成后」钩子；传输最终成功后调用。
    pub fn with_after_complete_hook<F, Fut>(mut self, f: F) -> Self
    where
        F: FnMut() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.add(AfterCompleteHookAdapter(f));
        self
    }

    /// 执行传输。`error_exit` 关闭时，致命错误折算为 500 状态码返回，
    /// 开启时原样抛出。
    pub async fn send(self) -> Result<TransferStatus, TransferError> {
        let error_exit = self.request.error_exit;
        match self.run().await {
            Ok(status) => Ok(status),
            Err(e) if error_exit => Err(e),
            Err(_) => Ok(TransferStatus::Protocol(FATAL_STATUS_CODE)),
        }
    }

    /// 状态机主循环。外层 loop 是校验失败后的重置重试循环。
    async fn run(self) -> Result<TransferStatus, TransferError> {
        let request = self.request;
        let connector = self.connector;
        let progress = self.progress;
        let hooks = Arc::new(Mutex::new(self.hooks));

        fs::create_dir_all(&request.save_dir)
            .await
            .map_err(TransferError::CreateDir)?;

        // 回环检测：上一次校验失败时算出的错误哈希
        let mut previous_wrong: Option<String> = None;

        loop {
            let prepared = match prepare_attempt(connector.as_ref(), &request).await? {
                PrepareOutcome::Ready(p) => p,
                PrepareOutcome::Failed(status) => return Ok(status),
            };

            let total = prepared.header.content_length;
            progress.update(TransferProgress {
                bytes_done: 0,
                total: (total > 0).then_some(total),
            });

            hooks.lock().await.run_before_start().await?;

            let output_path = request.output_path(&prepared.header.file_name);
            let manifest = Arc::new(prepared.manifest);

            let status = if prepared.plan.method == TransferMethod::Full {
                let body = match prepared.probe_body {
                    Some(body) => body,
                    // 恢复的 Full 传输没有现成的响应流，重新发一次普通 GET
                    None => {
                        let reply = connector
                            .exchange(ExchangeParams {
                                url: &request.url,
                                headers: &request.headers,
                                cookies: &request.cookies,
                                range: None,
                            })
                            .await;
                        if !(200..300).contains(&reply.status) {
                            return Ok(TransferStatus::from_code(reply.status));
                        }
                        reply.body
                    }
                };
                run_full_stream(FullStreamParams {
                    body,
                    output_path: output_path.clone(),
                    total: (total > 0).then_some(total),
                    progress: progress.clone(),
                    hooks: Arc::clone(&hooks),
                })
                .await?
            } else {
                run_piece_scheduler(PieceSchedulerParams {
                    connector: Arc::clone(&connector),
                    request: Arc::clone(&request),
                    plan: prepared.plan,
                    total,
                    completed: prepared.completed,
                    output_path: output_path.clone(),
                    manifest: Arc::clone(&manifest),
                    progress: progress.clone(),
                    hooks: Arc::clone(&hooks),
                })
                .await?
            };

            if status != TransferStatus::Success {
                // sidecar 留在磁盘上，下次调用据此恢复
                return Ok(status);
            }

            // —— 校验阶段（join 屏障之后才会走到这里）——
            let expected = match &prepared.header.hash {
                None => {
                    // 没有期望哈希就不校验，直接成功收尾
                    manifest.delete().await?;
                    hooks.lock().await.run_after_complete().await;
                    return Ok(TransferStatus::Success);
                }
                Some(h) => h.clone(),
            };

            match verify_output(&output_path, &expected).await? {
                None => {
                    manifest.delete().await?;
                    hooks.lock().await.run_after_complete().await;
                    return Ok(TransferStatus::Success);
                }
                Some(computed) => {
                    // 输出已损坏：删掉产物，清单重置为只剩头部
                    fs::remove_file(&output_path)
                        .await
                        .map_err(TransferError::RemoveFile)?;
                    manifest.reset(&prepared.header).await?;

                    let stop = !request.retry.unlimited
                        || previous_wrong.as_deref() == Some(computed.as_str());
                    if stop {
                        // 连续两次同一个错误哈希 ⇒ 源本身损坏，不再循环
                        if request.error_exit {
                            return Err(TransferError::HashMismatch {
                                expected,
                                computed,
                            });
                        }
                        return Ok(TransferStatus::CorruptSource);
                    }

                    previous_wrong = Some(computed);
                    // 清单刚被重置，下一代会以恢复模式整体重拉每一个分片
                    continue;
                }
            }
        }
    }
}

/// 一代传输的准备结果：清单、身份头、已完成集合、分片规划与
/// （新传输时）探测响应体。
struct PreparedAttempt {
    manifest: Manifest,
    header: ManifestHeader,
    completed: HashSet<PieceRange>,
    plan: PiecePlan,
    probe_body: Option<BodyStream>,
}

enum PrepareOutcome {
    Ready(PreparedAttempt),
    /// 探测失败，状态码直接成为整体结果
    Failed(TransferStatus),
}

/// 准备一代传输：sidecar 存在则恢复（短路探测），否则探测 + 规划 + 建清单。
async fn prepare_attempt(
    connector: &dyn Connector,
    request: &TransferRequest,
) -> Result<PrepareOutcome, TransferError> {
    // 请求里显式给了文件名时，探测前就能定位 sidecar
    if let Some(name) = request.file_name.as_deref() {
        let sidecar = request.sidecar_path(name);
        if Manifest::exists(&sidecar) {
            let prepared = resume_from_sidecar(&sidecar, request).await?;
            return Ok(PrepareOutcome::Ready(prepared));
        }
    }

    let outcome = probe(connector, request).await;
    if !outcome.is_ok() {
        return Ok(PrepareOutcome::Failed(TransferStatus::from_code(
            outcome.status,
        )));
    }

    let raw_name = outcome
        .file_name
        .clone()
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
    let file_name = sanitize_file_name(&raw_name);
    check_file_name(&file_name)?;

    // 文件名来自探测时，此刻才知道 sidecar 路径；已存在则转入恢复
    let sidecar = request.sidecar_path(&file_name);
    if Manifest::exists(&sidecar) {
        let prepared = resume_from_sidecar(&sidecar, request).await?;
        return Ok(PrepareOutcome::Ready(prepared));
    }

    let size = outcome.content_length.unwrap_or(0);
    let piece_plan = plan(size, request.max_threads, request.piece_size, request.method);
    let header = ManifestHeader {
        url: request.url.clone(),
        file_name,
        content_length: size,
        hash: outcome.hash.clone(),
        threads: piece_plan.piece_count,
        method: piece_plan.method,
        headers: request.headers.clone(),
        cookies: request.cookies.clone(),
    };
    let manifest = Manifest::create(&sidecar, &header).await?;

    Ok(PrepareOutcome::Ready(PreparedAttempt {
        manifest,
        header,
        completed: HashSet::new(),
        plan: piece_plan,
        probe_body: Some(outcome.body),
    }))
}

/// 从 sidecar 恢复：身份来自清单头，分片划分按头里记录的分片数反推。
/// 输出文件已经丢失时，已记录的分片无从校验，清空记录整体重拉。
async fn resume_from_sidecar(
    sidecar: &Path,
    request: &TransferRequest,
) -> Result<PreparedAttempt, TransferError> {
    let (manifest, header, mut completed) = Manifest::load(sidecar).await?;

    let output = request.output_path(&header.file_name);
    if !output.exists() && !completed.is_empty() {
        manifest.reset(&header).await?;
        completed.clear();
    }

    let piece_plan = plan_resume(
        header.content_length,
        header.threads,
        request.piece_size,
        header.method,
    );

    Ok(PreparedAttempt {
        manifest,
        header,
        completed,
        plan: piece_plan,
        probe_body: None,
    })
}
