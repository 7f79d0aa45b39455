use crate::internal::transfer::structs::piece_range::PieceRange;
use crate::internal::transfer::traits::hook::{HookAbort, TransferHook};

/// 钩子容器：按注册顺序依次执行多个钩子。
#[derive(Default)]
pub struct TransferHooksContainer {
    hooks: Vec<Box<dyn TransferHook>>,
}

impl TransferHooksContainer {
    /// 添加一个传输钩子；支持多次调用以注册多个钩子。
    pub fn add(&mut self, hook: impl TransferHook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub async fn run_before_start(&mut self) -> Result<(), HookAbort> {
        for h in self.hooks.iter_mut() {
            h.before_start().await?;
        }
        Ok(())
    }

    pub fn run_on_piece_done(&mut self, range: &PieceRange) {
        for h in self.hooks.iter_mut() {
            h.on_piece_done(range);
        }
    }

    pub fn run_on_progress(&mut self, bytes_done: u64, total: Option<u64>) {
        for h in self.hooks.iter_mut() {
            h.on_progress(bytes_done, total);
        }
    }

    pub async fn run_after_complete(&mut self) {
        for h in self.hooks.iter_mut() {
            h.after_complete().await;
        }
    }
}
