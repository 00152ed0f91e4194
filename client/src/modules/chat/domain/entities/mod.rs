// Chat Domain - Entities
// 实体具有唯一标识

mod message;
mod session;

pub use message::*;
pub use session::*;
