// Modules Layer - 业务模块
//
// 按照六边形架构组织的业务模块：
// - chat: 对话模块，处理消息发送、逐字显示与情绪指示
// - config: 配置模块，启动时加载
// - notification: 推送通道模块
// - persona: 人格选择模块
// - storage: 键值存储模块
// - theme: 主题模块

pub mod chat;
pub mod config;
pub mod notification;
pub mod persona;
pub mod storage;
pub mod theme;

pub use chat::ConversationController;
pub use notification::NotificationChannel;
pub use persona::PersonaSelector;
pub use theme::ThemeController;
