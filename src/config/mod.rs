//! 配置管理
//!
//! 静态配置在启动时加载一次；请求路径上需要的配置节通过 `web::Data` 注入。

#[path = "impl.rs"]
mod loader;
mod structs;

pub use structs::*;
