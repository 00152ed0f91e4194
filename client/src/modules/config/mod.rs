// Config Module - 配置模块
//
// 启动时加载一次，显式注入各组件：
// - entities: ClientConfig 及其派生值
// - loader: 默认值 → JSON 文件 → 环境变量 分层加载

mod entities;
mod loader;

pub use entities::*;
pub use loader::*;
