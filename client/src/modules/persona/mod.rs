// Persona Module - 人格选择模块
//
// - domain: Persona 与列表响应
// - ports: PersonaDirectoryPort 人格目录端口
// - http_directory: GET 人格列表的 HTTP 实现
// - selector: PersonaSelector，加载、选择并持久化当前人格

mod domain;
mod http_directory;
mod ports;
mod selector;

pub use domain::*;
pub use http_directory::*;
pub use ports::*;
pub use selector::*;
