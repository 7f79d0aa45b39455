//! 引擎端到端测试：状态机全路径（探测 → 规划 → 调度 → 校验 → 收尾），
//! 以及恢复、回环检测与钩子。

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::tests::{load_live_optional, random_payload, sha256_hex, temp_workspace, MockConnector};
use crate::transfer::{
    plan, HookAbort, Manifest, TransferEngine, TransferError, TransferMethod, TransferRequest,
    TransferStatus,
};
use crate::transfer_file_with;

const URL: &str = "https://example.com/files/data.bin";

/// 快乐路径：探测拿到大小与哈希头，多线程分片下载，校验通过后清理 sidecar。
#[tokio::test]
async fn success_with_advertised_hash() {
    let dir = temp_workspace("engine_success");
    let payload = random_payload(300_000);
    let connector = Arc::new(MockConnector::new(payload.clone()).with_hash());

    let request = TransferRequest::builder(URL, dir.clone())
        .max_threads(4)
        .piece_size(64 * 1024)
        .retry_delay_ms(1)
        .build()
        .unwrap();
    let sidecar = request.sidecar_path("data.bin");

    let status = transfer_file_with(connector.clone(), request).await.unwrap();
    assert_eq!(status, TransferStatus::Success);
    assert_eq!(std::fs::read(dir.join("data.bin")).unwrap(), payload);
    assert!(!sidecar.exists());
}

/// 文件名优先级：disposition 头胜过 URL 路径段，且落盘前会被清洗。
#[tokio::test]
async fn disposition_name_wins_and_gets_sanitized() {
    let dir = temp_workspace("engine_disposition");
    let payload = random_payload(10_000);
    let connector = Arc::new(
        MockConnector::new(payload.clone()).with_disposition("报告:v1.bin"),
    );

    let request = TransferRequest::builder(URL, dir.clone())
        .retry_delay_ms(1)
        .build()
        .unwrap();
    let status = transfer_file_with(connector, request).await.unwrap();

    assert_eq!(status, TransferStatus::Success);
    assert_eq!(std::fs::read(dir.join("报告_v1.bin")).unwrap(), payload);
}

/// Full 方式复用探测的响应体：从头到尾只有一次交换。
#[tokio::test]
async fn full_reuses_probe_body_with_single_exchange() {
    let dir = temp_workspace("engine_full");
    let payload = random_payload(50_000);
    let connector = Arc::new(MockConnector::new(payload.clone()));

    let request = TransferRequest::builder(URL, dir.clone())
        .method(TransferMethod::Full)
        .retry_delay_ms(1)
        .build()
        .unwrap();
    let status = transfer_file_with(connector.clone(), request).await.unwrap();

    assert_eq!(status, TransferStatus::Success);
    assert_eq!(std::fs::read(dir.join("data.bin")).unwrap(), payload);
    assert_eq!(connector.requested().len(), 1);
    assert!(connector.requested_ranges().is_empty());
}

/// 大小为 0 的资源自动降级为 Full，产出空文件。
#[tokio::test]
async fn empty_resource_downgrades_to_full() {
    let dir = temp_workspace("engine_empty");
    let connector = Arc::new(MockConnector::new(Vec::new()));

    let request = TransferRequest::builder(URL, dir.clone())
        .retry_delay_ms(1)
        .build()
        .unwrap();
    let status = transfer_file_with(connector.clone(), request).await.unwrap();

    assert_eq!(status, TransferStatus::Success);
    assert_eq!(std::fs::read(dir.join("data.bin")).unwrap(), Vec::<u8>::new());
    assert_eq!(connector.requested().len(), 1);
}

/// 探测失败时状态码直接成为整体结果，不会创建任何文件。
#[tokio::test]
async fn probe_failure_becomes_overall_status() {
    let dir = temp_workspace("engine_probe_fail");
    let connector = Arc::new(MockConnector::new(random_payload(1000)));
    connector.script_status("probe", vec![404]);

    let request = TransferRequest::builder(URL, dir.clone())
        .retry_delay_ms(1)
        .build()
        .unwrap();
    let status = transfer_file_with(connector, request).await.unwrap();

    assert_eq!(status, TransferStatus::Protocol(404));
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
}

/// 协议状态码按分类透传：探测返回 403 映射到 CorruptSource 一类。
#[tokio::test]
async fn probe_403_maps_to_corrupt_source_class() {
    let dir = temp_workspace("engine_probe_403");
    let connector = Arc::new(MockConnector::new(random_payload(1000)));
    connector.script_status("probe", vec![403]);

    let request = TransferRequest::builder(URL, dir).retry_delay_ms(1).build().unwrap();
    let status = transfer_file_with(connector, request).await.unwrap();
    assert_eq!(status, TransferStatus::CorruptSource);
}

/// 中断后的恢复：第二次调用不发探测请求，只拉取清单里缺的分片，
/// 成功后 sidecar 被清理。
#[tokio::test]
async fn resume_fetches_only_missing_pieces() {
    let dir = temp_workspace("engine_resume");
    let payload = random_payload(200_000);
    let request = TransferRequest::builder(URL, dir.clone())
        .file_name("data.bin")
        .max_threads(4)
        .piece_size(32 * 1024)
        .max_retries(1)
        .retry_delay_ms(20)
        .build()
        .unwrap();

    let piece_plan = plan(200_000, 4, 32 * 1024, TransferMethod::Multithread);
    let failing = piece_plan.piece_range(200_000, 3);

    // 第一次传输：最后一个分片始终被截短，重试耗尽后整体 408
    let first = Arc::new(MockConnector::new(payload.clone()));
    first.serve_short(failing.id(), 10);
    let status = transfer_file_with(first, request.clone()).await.unwrap();
    assert_eq!(status, TransferStatus::Timeout);

    let sidecar = request.sidecar_path("data.bin");
    assert!(sidecar.exists());
    let (_m, _h, completed) = Manifest::load(&sidecar).await.unwrap();
    assert!(!completed.is_empty());
    assert!(!completed.contains(&failing));

    // 第二次传输：身份来自清单头，已完成分片不再请求
    let second = Arc::new(MockConnector::new(payload.clone()));
    let status = transfer_file_with(second.clone(), request).await.unwrap();
    assert_eq!(status, TransferStatus::Success);

    assert!(second.requested().iter().all(|r| r.is_some()), "恢复路径不应探测");
    let refetched = second.requested_ranges();
    assert!(refetched.contains(&failing));
    assert!(refetched.iter().all(|r| !completed.contains(r)));

    assert_eq!(std::fs::read(dir.join("data.bin")).unwrap(), payload);
    assert!(!sidecar.exists());
}

/// 回环检测：无限重试下连续两次算出同一个错误哈希即判定源损坏，
/// 不会无止境地重拉。
#[tokio::test]
async fn corrupt_source_breaks_unlimited_retry_loop() {
    let dir = temp_workspace("engine_loop_breaker");
    let payload = random_payload(100_000);
    let connector = Arc::new(MockConnector::new(payload).with_hash());
    connector.set_corrupt(true);

    let request = TransferRequest::builder(URL, dir.clone())
        .max_threads(4)
        .piece_size(32 * 1024)
        .unlimited_retry()
        .retry_delay_ms(1)
        .build()
        .unwrap();
    let sidecar = request.sidecar_path("data.bin");

    let status = transfer_file_with(connector.clone(), request).await.unwrap();
    assert_eq!(status, TransferStatus::CorruptSource);

    // 恰好两代分片池：第一代失败后重置重拉，第二代哈希相同即停
    assert_eq!(connector.requested_ranges().len(), 8);
    // 损坏的产物被删除，sidecar 保留（头部完好，无分片记录）
    assert!(!dir.join("data.bin").exists());
    assert!(sidecar.exists());
}

/// 未开无限重试时，第一次校验失败就按源损坏收场。
#[tokio::test]
async fn single_verify_failure_without_unlimited_retry() {
    let dir = temp_workspace("engine_single_mismatch");
    let payload = random_payload(100_000);
    let connector = Arc::new(MockConnector::new(payload).with_hash());
    connector.set_corrupt(true);

    let request = TransferRequest::builder(URL, dir)
        .max_threads(4)
        .piece_size(32 * 1024)
        .retry_delay_ms(1)
        .build()
        .unwrap();

    let status = transfer_file_with(connector.clone(), request).await.unwrap();
    assert_eq!(status, TransferStatus::CorruptSource);
    assert_eq!(connector.requested_ranges().len(), 4);
}

/// error_exit 开启时校验失败以错误抛出，携带两个哈希。
#[tokio::test]
async fn error_exit_surfaces_hash_mismatch() {
    let dir = temp_workspace("engine_error_exit");
    let payload = random_payload(40_000);
    let corrupted: Vec<u8> = payload.iter().map(|b| !b).collect();
    let connector = Arc::new(MockConnector::new(payload.clone()).with_hash());
    connector.set_corrupt(true);

    let request = TransferRequest::builder(URL, dir)
        .piece_size(16 * 1024)
        .retry_delay_ms(1)
        .error_exit()
        .build()
        .unwrap();

    let err = transfer_file_with(connector, request).await.unwrap_err();
    match err {
        TransferError::HashMismatch { expected, computed } => {
            assert_eq!(expected, sha256_hex(&payload));
            assert_eq!(computed, sha256_hex(&corrupted));
        }
        other => panic!("意料之外的错误: {other}"),
    }
}

/// 配置错误在任何网络调用之前就报出。
#[test]
fn builder_rejects_invalid_config() {
    assert!(matches!(
        TransferRequest::builder(URL, "/tmp").max_threads(0).build(),
        Err(TransferError::ZeroThreads)
    ));
    assert!(matches!(
        TransferRequest::builder(URL, "/tmp").piece_size(0).build(),
        Err(TransferError::ZeroPieceSize)
    ));
    assert!(matches!(
        TransferRequest::builder(URL, "/tmp").file_name("a".repeat(300)).build(),
        Err(TransferError::FileNameTooLong(_, _))
    ));
}

/// 钩子与进度贯穿整个生命周期：分片完成数、最终字节数、完成回调。
#[tokio::test]
async fn hooks_and_progress_observe_lifecycle() {
    let dir = temp_workspace("engine_hooks");
    let payload = random_payload(100_000);
    let size = payload.len() as u64;
    let connector = Arc::new(MockConnector::new(payload));

    let request = TransferRequest::builder(URL, dir)
        .max_threads(4)
        .piece_size(32 * 1024)
        .retry_delay_ms(1)
        .build()
        .unwrap();

    let pieces = Arc::new(AtomicUsize::new(0));
    let max_bytes = Arc::new(AtomicU64::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let engine = TransferEngine::with_connector(request, connector)
        .with_on_piece_hook({
            let pieces = Arc::clone(&pieces);
            move |_range| {
                pieces.fetch_add(1, Ordering::Relaxed);
            }
        })
        .with_on_progress_hook({
            let max_bytes = Arc::clone(&max_bytes);
            move |bytes_done, total| {
                assert_eq!(total, Some(size));
                max_bytes.fetch_max(bytes_done, Ordering::Relaxed);
            }
        })
        .with_after_complete_hook({
            let finished = Arc::clone(&finished);
            move || {
                let finished = Arc::clone(&finished);
                async move {
                    finished.store(true, Ordering::Relaxed);
                }
            }
        });

    let progress = engine.progress();
    let status = engine.send().await.unwrap();

    assert_eq!(status, TransferStatus::Success);
    assert_eq!(pieces.load(Ordering::Relaxed), 4);
    assert_eq!(max_bytes.load(Ordering::Relaxed), size);
    assert!(finished.load(Ordering::Relaxed));

    let snapshot = progress.get_current();
    assert_eq!(snapshot.bytes_done, size);
    assert_eq!(snapshot.total, Some(size));
}

/// 「开始前」钩子中止传输：error_exit 开启时原样抛出，关闭时折算为 500。
#[tokio::test]
async fn before_start_hook_aborts_transfer() {
    let dir = temp_workspace("engine_hook_abort");
    let payload = random_payload(10_000);

    let strict = TransferRequest::builder(URL, dir.clone())
        .retry_delay_ms(1)
        .error_exit()
        .build()
        .unwrap();
    let engine = TransferEngine::with_connector(strict, Arc::new(MockConnector::new(payload.clone())))
        .with_before_start_hook(|| async { Err(HookAbort) });
    assert!(matches!(
        engine.send().await,
        Err(TransferError::HookAbort(_))
    ));

    let lenient = TransferRequest::builder(URL, dir)
        .retry_delay_ms(1)
        .build()
        .unwrap();
    let engine = TransferEngine::with_connector(lenient, Arc::new(MockConnector::new(payload)))
        .with_before_start_hook(|| async { Err(HookAbort) });
    assert_eq!(engine.send().await.unwrap(), TransferStatus::Protocol(500));
}

/// 真实环境测试：配置了 `src/tests/env/live.env` 时才会实际发请求。
#[tokio::test]
async fn live_transfer_when_configured() {
    let Some(account) = load_live_optional() else {
        eprintln!("未配置 live.env，跳过真实环境测试");
        return;
    };

    let request = TransferRequest::builder(account.url, account.save_dir)
        .max_threads(4)
        .build()
        .unwrap();
    let status = crate::transfer_file(request).await.unwrap();
    eprintln!("live 传输结果: {status}");
    assert!(status.is_success());
}
