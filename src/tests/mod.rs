//! 测试入口：`lib` 放公共的模拟连接器与工具，`internal` 放各模块的集成测试。

#[cfg(test)]
pub use lib::*;
