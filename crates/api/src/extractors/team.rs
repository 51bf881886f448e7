use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use bson::oid::ObjectId;

use crate::error::ApiError;

/// Extracts team_id from the URL path parameter `:team_id`
#[derive(Debug, Clone)]
pub struct TeamId(pub ObjectId);

impl<S> FromRequestParts<S> for TeamId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params): Path<std::collections::HashMap<String, String>> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::BadRequest("Missing path parameters".to_string()))?;

        let tid_str = params
            .get("team_id")
            .ok_or_else(|| ApiError::BadRequest("Missing team_id parameter".to_string()))?;

        let team_id = ObjectId::parse_str(tid_str)
            .map_err(|_| ApiError::BadRequest("Invalid team_id format".to_string()))?;

        Ok(TeamId(team_id))
    }
}
