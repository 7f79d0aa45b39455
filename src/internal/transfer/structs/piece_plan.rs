//! 分片规划：纯函数，根据资源大小、线程上限与分片大小提示计算实际传输方式与分片划分。
//!
//! 无任何 I/O，便于直接做单元测试。

use super::piece_range::PieceRange;
use super::transfer_method::TransferMethod;

/// 分片规划结果：实际生效的传输方式、分片数与分片大小。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PiecePlan {
    /// 实际生效的传输方式（可能与请求的方式不同，如 size 未知时强制 Full）
    pub method: TransferMethod,
    /// 分片总数
    pub piece_count: u64,
    /// 每个分片的字节数（最后一片截断到剩余部分）
    pub piece_size: u64,
}

/// 按规则顺序计算分片规划：
///
/// 1. `size` 未知或为 0 时，无法做 Range 切分，无论请求什么方式都强制 `Full`；
/// 2. `Full`：1 片，覆盖整个资源（复用探测时已拿到的响应流，不发额外请求）；
/// 3. `Piece`：严格按提示切分，分片数 = ⌈size / piece_size_hint⌉，不受线程上限约束；
/// 4. `Multithread`（默认）：并发上限 = min(⌈size / piece_size_hint⌉, max_threads)，
///    分片大小向上取整到提示的整数倍（每个分片拿整数个提示单元），
///    分片数 = ⌈size / 分片大小⌉，因此永不超过并发上限；
/// 5. `Mandatory`：强制 max_threads 片，分片大小 = ⌈size / max_threads⌉，
///    小文件会产生越界分片，由服务端拒绝；
/// 6. `File`（恢复模式）用清单头里记录的生效分片数重新走一遍同样的计算，
///    见 [`plan_resume`]，不会落到这里的 `File` 分支。
pub fn plan(
    size: u64,
    max_threads: u64,
    piece_size_hint: u64,
    method: TransferMethod,
) -> PiecePlan {
    if size == 0 {
        return PiecePlan {
            method: TransferMethod::Full,
            piece_count: 1,
            piece_size: 0,
        };
    }

    match method {
        TransferMethod::Full => PiecePlan {
            method: TransferMethod::Full,
            piece_count: 1,
            piece_size: size,
        },
        TransferMethod::Piece => PiecePlan {
            method: TransferMethod::Piece,
            piece_count: size.div_ceil(piece_size_hint),
            piece_size: piece_size_hint,
        },
        TransferMethod::Multithread | TransferMethod::File => {
            let cap = size.div_ceil(piece_size_hint).min(max_threads).max(1);
            let piece_size = size.div_ceil(cap * piece_size_hint) * piece_size_hint;
            PiecePlan {
                method: TransferMethod::Multithread,
                piece_count: size.div_ceil(piece_size),
                piece_size,
            }
        }
        TransferMethod::Mandatory => PiecePlan {
            method: TransferMethod::Mandatory,
            piece_count: max_threads,
            piece_size: size.div_ceil(max_threads),
        },
    }
}

/// 恢复模式下的规划：清单头的 `threads` 字段记录的是当时实际生效的分片数，
/// 以它为线程上限、按头里记录的方式重走一遍 [`plan`]，即可还原与首次传输
/// 相同的分片划分（分片大小提示取自本次请求，调用方须保持一致）。
pub fn plan_resume(
    size: u64,
    recorded_threads: u64,
    piece_size_hint: u64,
    method: TransferMethod,
) -> PiecePlan {
    plan(size, recorded_threads.max(1), piece_size_hint, method)
}

impl PiecePlan {
    /// 第 `index` 片的区间：`start = index * piece_size`，
    /// 最后一片的 `end` 截断到 `size - 1`。
    pub fn piece_range(&self, size: u64, index: u64) -> PieceRange {
        let start = index * self.piece_size;
        let end = if index + 1 == self.piece_count {
            size.saturating_sub(1)
        } else {
            (index + 1) * self.piece_size - 1
        };
        PieceRange::new(start, end)
    }

    /// 全部分片区间，按 `start` 升序。
    pub fn ranges(&self, size: u64) -> Vec<PieceRange> {
        (0..self.piece_count)
            .map(|i| self.piece_range(size, i))
            .collect()
    }
}
