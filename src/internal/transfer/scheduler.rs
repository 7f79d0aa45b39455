//! 分片调度：有界并发的分片任务池与 Full 单流写盘。

pub mod full_stream;
pub mod piece_task;
pub mod schedule;
pub mod spawn_tasks;

pub use full_stream::{run_full_stream, FullStreamParams};
pub use schedule::{run_piece_scheduler, PieceSchedulerParams};
