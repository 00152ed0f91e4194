// Storage Module - 键值存储模块
//
// 取代浏览器 localStorage：
// - ports: KeyValueStore 端口定义
// - memory_store: 内存实现（测试）
// - file_store: JSON 文件实现

mod file_store;
mod memory_store;
mod ports;

pub use file_store::*;
pub use memory_store::*;
pub use ports::*;
