//! Job position usecases.

use std::sync::Arc;

use tracing::instrument;

use crate::domain::{AppError, NewPosition, Position, PositionRepository, PositionRequest};

pub struct PositionService {
    positions: Arc<dyn PositionRepository>,
}

impl PositionService {
    #[must_use]
    pub fn new(positions: Arc<dyn PositionRepository>) -> Self {
        Self { positions }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Position, AppError> {
        self.positions.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn fetch_position(&self, limit: i64, offset: i64) -> Result<Vec<Position>, AppError> {
        self.positions.fetch(limit, offset).await
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn store_position(&self, request: &PositionRequest) -> Result<Position, AppError> {
        self.positions.create(&NewPosition::from(request)).await
    }

    /// Overwrite an existing position; the update is skipped when the lookup fails
    #[instrument(skip(self, request))]
    pub async fn edit_position(
        &self,
        id: i64,
        request: &PositionRequest,
    ) -> Result<Position, AppError> {
        self.positions.find_by_id(id).await?;
        self.positions
            .update_by_id(id, &NewPosition::from(request))
            .await
    }

    #[instrument(skip(self))]
    pub async fn destroy_position(&self, id: i64) -> Result<(), AppError> {
        self.positions.delete(id).await
    }
}
