//! 传输进度：基于 [`tokio::sync::watch`] 的轻量响应式状态。
//!
//! 引擎内部更新，调用方通过 [`ProgressProperty::watch`] 监听或
//! [`ProgressProperty::get_current`] 读取快照。读写不阻塞，适合高频更新。

use std::sync::Arc;

use tokio::sync::watch;

/// 传输进度快照：已落盘字节数与总大小（未知时为 `None`）。
#[derive(Debug, Clone, Default)]
pub struct TransferProgress {
    /// 已成功写入输出文件的字节数（分片完成时按片累加）
    pub bytes_done: u64,
    /// 资源总大小（字节），未知时为 `None`
    pub total: Option<u64>,
}

impl TransferProgress {
    /// 进度百分比（0～100）；总大小为 0 或未知时返回 `f64::NAN`。
    pub fn pct(&self) -> f64 {
        self.total
            .filter(|&t| t > 0)
            .map(|t| (self.bytes_done as f64 / t as f64) * 100.0)
            .unwrap_or(f64::NAN)
    }
}

/// 可共享的进度属性句柄：clone 后各持有者看到同一份状态。
#[derive(Debug, Clone)]
pub struct ProgressProperty {
    sender: Arc<watch::Sender<TransferProgress>>,
}

impl ProgressProperty {
    pub fn new(initial: TransferProgress) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// 整体覆盖当前进度，所有监听者都会收到通知。
    pub fn update(&self, progress: TransferProgress) {
        let _ = self.sender.send(progress);
    }

    /// 累加已完成字节数（分片成功落盘时调用）。
    pub fn add_bytes(&self, bytes: u64) {
        self.sender.send_modify(|p| p.bytes_done += bytes);
    }

    /// 仅更新总大小（探测拿到 content-length 之后调用）。
    pub fn set_total(&self, total: Option<u64>) {
        self.sender.send_modify(|p| p.total = total);
    }

    /// 当前进度快照（clone 一次）。
    pub fn get_current(&self) -> TransferProgress {
        self.sender.borrow().clone()
    }

    /// 订阅进度变更；`changed().await` 之后用 `borrow_and_update()` 取值。
    pub fn watch(&self) -> watch::Receiver<TransferProgress> {
        self.sender.subscribe()
    }
}

impl Default for ProgressProperty {
    fn default() -> Self {
        Self::new(TransferProgress::default())
    }
}
