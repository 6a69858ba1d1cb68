use crate::cache::{ObjectCache, create_cache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::queue::{EventStore, create_event_store};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

/// 服务器运行期间共享的依赖
pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub event_store: Arc<dyn EventStore>,
    pub cache: Arc<dyn ObjectCache>,
}

/// 准备服务器启动的上下文
/// 包括存储、待评测队列和缓存
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，忽略即可
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        debug!("rustls crypto provider already installed");
    }

    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    let event_store = create_event_store(&config.queue).await?;
    warn!("Event store initialized ({})", config.queue.queue_type);

    let cache = create_cache(&config.cache).await?;
    warn!("Cache backend initialized");

    Ok(StartupContext {
        storage,
        event_store,
        cache,
    })
}
