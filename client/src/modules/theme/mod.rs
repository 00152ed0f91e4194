// Theme Module - 主题模块
//
// - domain: Theme 与显示外观
// - ports: ThemeSurface 显示端口
// - controller: 主题应用、切换与持久化

mod controller;
mod domain;
mod ports;

pub use controller::*;
pub use domain::*;
pub use ports::*;
