// Chat Module - 对话模块
// 遵循六边形架构：领域层、端口层、应用层、基础设施层

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::*;
pub use domain::*;
pub use ports::*;
