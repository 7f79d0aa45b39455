//! 分片区间：资源中一段连续的字节区间 `[start, end]`（闭区间），可独立请求。

/// 分片区间（闭区间字节偏移）。全部区间无缝隙、无重叠地覆盖 `[0, size)`。
///
/// 清单文件中以 `"start-end"` 字符串作为分片的标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceRange {
    /// 起始偏移（含）
    pub start: u64,
    /// 结束偏移（含）
    pub end: u64,
}

impl PieceRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// 分片标识：`"start-end"`，清单里一行记录一个。
    pub fn id(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }

    /// 从分片标识解析；格式非法时返回 `None`（清单中的脏行直接忽略）。
    pub fn parse_id(id: &str) -> Option<Self> {
        let (start, end) = id.trim().split_once('-')?;
        let start: u64 = start.parse().ok()?;
        let end: u64 = end.parse().ok()?;
        if end < start {
            return None;
        }
        Some(Self { start, end })
    }

    /// 区间字节数（闭区间，因此为 `end - start + 1`）。
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

impl std::fmt::Display for PieceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
