use tokio::signal;
use tracing::{error, warn};

use super::startup::StartupContext;

pub async fn listen_for_shutdown() {
    // 等待 Ctrl+C 信号
    if let Err(e) = signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
        // 无法监听信号时交由服务器自行结束
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
}

/// 释放共享依赖，Redis 连接随之关闭
pub fn release(context: StartupContext) {
    let StartupContext {
        storage,
        event_store,
        cache,
    } = context;
    drop(event_store);
    drop(cache);
    drop(storage);
    warn!("Event store and cache connections released");
}
