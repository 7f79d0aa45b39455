//! 连接器实现。接口定义见 [`crate::internal::transfer::traits::connector`]。

pub mod reqwest_connector;

pub use reqwest_connector::ReqwestConnector;
