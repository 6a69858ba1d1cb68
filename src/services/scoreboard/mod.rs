pub mod rank;
pub mod scores;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::storage::Storage;

pub struct ScoreboardService {
    storage: Option<Arc<dyn Storage>>,
}

impl ScoreboardService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from(&self.storage, request)
    }

    /// 获取作业排行榜
    pub async fn get_scoreboard(
        &self,
        request: &HttpRequest,
        assignment_uid: &str,
    ) -> ActixResult<HttpResponse> {
        scores::get_scoreboard(self, request, assignment_uid).await
    }
}
