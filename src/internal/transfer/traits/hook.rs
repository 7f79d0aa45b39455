//! 传输流程钩子：在「开始前 / 分片完成 / 进度 / 完成后」插入自定义逻辑。

use async_trait::async_trait;

use crate::internal::transfer::structs::piece_range::PieceRange;

/// 钩子执行时请求中止传输时使用的错误。
#[derive(Debug, Clone)]
pub struct HookAbort;

impl std::fmt::Display for HookAbort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("传输被钩子中止")
    }
}

impl std::error::Error for HookAbort {}

/// 传输流程钩子。
///
/// 使用方式二选一（可混用）：
/// - **单阶段**：用引擎的 `with_before_start_hook` / `with_on_piece_hook` /
///   `with_on_progress_hook` / `with_after_complete_hook` 传入闭包；
/// - **完整钩子**：实现本 trait，通过引擎的 `with_hook` 注册。
#[async_trait]
pub trait TransferHook: Send + Sync {
    /// 每一代分片池启动前调用（如：加锁、校验路径）。返回 `Err` 则中止本次传输。
    async fn before_start(&mut self) -> Result<(), HookAbort> {
        Ok(())
    }

    /// 一个分片成功落盘并写入清单后调用。
    fn on_piece_done(&mut self, _range: &PieceRange) {}

    /// 进度更新（累计已落盘字节、总大小）。
    fn on_progress(&mut self, _bytes_done: u64, _total: Option<u64>) {}

    /// 传输最终成功（校验通过、清单已删除）后调用。
    async fn after_complete(&mut self) {}
}
