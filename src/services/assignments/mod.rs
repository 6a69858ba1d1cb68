pub mod state;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::requests::UpdateAssignmentStateRequest;
use crate::storage::Storage;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from(&self.storage, request)
    }

    /// 推进作业生命周期
    pub async fn update_state(
        &self,
        request: &HttpRequest,
        assignment_uid: &str,
        body: UpdateAssignmentStateRequest,
    ) -> ActixResult<HttpResponse> {
        state::update_state(self, request, assignment_uid, body).await
    }
}
