// Chat Domain - 领域层
// 包含实体与值对象

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
