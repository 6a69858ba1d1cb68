pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct PendingQueueService {
    storage: Option<Arc<dyn Storage>>,
}

impl PendingQueueService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from(&self.storage, request)
    }

    /// 列出作业当前的待评测队列
    pub async fn list_pending(
        &self,
        request: &HttpRequest,
        assignment_uid: &str,
    ) -> ActixResult<HttpResponse> {
        list::list_pending(self, request, assignment_uid).await
    }
}
