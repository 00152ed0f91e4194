// Chat Infrastructure Layer
// 端口的具体实现：HTTP 对话服务与两种渲染器

mod http_chat_service;
mod recording_renderer;
mod terminal_renderer;

pub use http_chat_service::*;
pub use recording_renderer::*;
pub use terminal_renderer::*;
