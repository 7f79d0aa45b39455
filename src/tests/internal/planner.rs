//! 分片规划纯函数测试：纸面可验算的划分规则。

use crate::transfer::{plan, plan_resume, TransferMethod};

const MIB: u64 = 1024 * 1024;

/// 10MB 资源、1MB 提示、4 线程：分片向上取整到提示的整数倍（3MB），
/// 共 4 片，最后一片截断到资源末尾。
#[test]
fn multithread_rounds_piece_size_to_hint_multiple() {
    let size = 10 * MIB;
    let p = plan(size, 4, MIB, TransferMethod::Multithread);

    assert_eq!(p.method, TransferMethod::Multithread);
    assert_eq!(p.piece_size, 3 * MIB);
    assert_eq!(p.piece_count, 4);

    let ranges = p.ranges(size);
    assert_eq!(ranges[0].id(), "0-3145727");
    assert_eq!(ranges[1].id(), "3145728-6291455");
    assert_eq!(ranges[2].id(), "6291456-9437183");
    assert_eq!(ranges[3].id(), "9437184-10485759");
}

/// 大小为 0（或未知）时无法做 Range 切分，无论请求什么方式都强制 Full。
#[test]
fn zero_size_forces_full() {
    for method in [
        TransferMethod::Full,
        TransferMethod::Piece,
        TransferMethod::Multithread,
        TransferMethod::Mandatory,
    ] {
        let p = plan(0, 8, MIB, method);
        assert_eq!(p.method, TransferMethod::Full);
        assert_eq!(p.piece_count, 1);
        assert_eq!(p.piece_size, 0);
    }
}

#[test]
fn full_is_a_single_piece() {
    let p = plan(12345, 8, MIB, TransferMethod::Full);
    assert_eq!(p.piece_count, 1);
    assert_eq!(p.piece_size, 12345);
    assert_eq!(p.ranges(12345), vec![p.piece_range(12345, 0)]);
    assert_eq!(p.piece_range(12345, 0).id(), "0-12344");
}

/// Piece 方式严格按提示切分，不受线程上限约束。
#[test]
fn piece_ignores_thread_cap() {
    let size = 10 * MIB + 1;
    let p = plan(size, 2, MIB, TransferMethod::Piece);
    assert_eq!(p.method, TransferMethod::Piece);
    assert_eq!(p.piece_count, 11);
    assert_eq!(p.piece_size, MIB);
    // 最后一片只有 1 字节
    let last = p.piece_range(size, 10);
    assert_eq!(last.start, 10 * MIB);
    assert_eq!(last.end, 10 * MIB);
}

/// 小文件走 Multithread 时并发上限被 ⌈size/提示⌉ 压到 1，单片完成。
#[test]
fn multithread_small_file_collapses_to_one_piece() {
    let p = plan(10, 4, MIB, TransferMethod::Multithread);
    assert_eq!(p.piece_count, 1);
    assert_eq!(p.piece_range(10, 0).id(), "0-9");
}

/// Mandatory 强制按线程数切；小文件会切出 end < start 的越界分片。
#[test]
fn mandatory_forces_thread_count_even_when_degenerate() {
    let p = plan(2, 4, MIB, TransferMethod::Mandatory);
    assert_eq!(p.method, TransferMethod::Mandatory);
    assert_eq!(p.piece_count, 4);
    assert_eq!(p.piece_size, 1);

    let last = p.piece_range(2, 3);
    assert!(last.end < last.start);
}

/// File 方式在规划层面等同 Multithread（恢复语义由引擎处理）。
#[test]
fn file_plans_like_multithread() {
    let size = 5 * MIB;
    let a = plan(size, 4, MIB, TransferMethod::File);
    let b = plan(size, 4, MIB, TransferMethod::Multithread);
    assert_eq!(a, b);
    assert_eq!(a.method, TransferMethod::Multithread);
}

/// 划分性质：首片从 0 开始，相邻分片无缝衔接，末片止于 size-1，
/// 分片数不超过线程上限。
#[test]
fn multithread_partition_covers_without_gaps() {
    for size in [1, MIB - 1, MIB, MIB + 1, 3 * MIB + 777, 100 * MIB + 13] {
        for threads in [1, 3, 4, 16] {
            let p = plan(size, threads, MIB, TransferMethod::Multithread);
            assert!(p.piece_count <= threads, "size={size} threads={threads}");

            let ranges = p.ranges(size);
            assert_eq!(ranges[0].start, 0);
            assert_eq!(ranges.last().unwrap().end, size - 1);
            for w in ranges.windows(2) {
                assert_eq!(w[0].end + 1, w[1].start);
            }
            for r in &ranges[..ranges.len() - 1] {
                assert_eq!(r.len(), p.piece_size);
            }
        }
    }
}

/// 恢复规划是首次规划的不动点：以生效分片数为上限重算，得到同一划分。
#[test]
fn resume_reproduces_original_partition() {
    for size in [MIB + 1, 10 * MIB, 37 * MIB + 5] {
        for threads in [2, 4, 16] {
            let first = plan(size, threads, MIB, TransferMethod::Multithread);
            let resumed = plan_resume(size, first.piece_count, MIB, first.method);
            assert_eq!(first, resumed, "size={size} threads={threads}");
        }
    }
}
