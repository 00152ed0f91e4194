// Chat Ports - 端口层
// 定义对话流程与外部世界之间的抽象接口

mod chat_service;
mod persona_provider;
mod render_port;

pub use chat_service::*;
pub use persona_provider::*;
pub use render_port::*;
