// Chat Application Layer - 应用层
// 对话控制器：一次只处理一个请求/响应往返

mod conversation;

pub use conversation::*;
