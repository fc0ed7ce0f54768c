use crate::domain::ActorRole;
use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};

use super::types::ErrorResponse;

/// 操作者のロールを渡すヘッダー
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// リクエストの操作者
///
/// ロールは`x-actor-role`ヘッダー（`admin` | `staff`）で明示的に受け取る。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor(pub ActorRole);

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(ACTOR_ROLE_HEADER).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(
                    "MISSING_ACTOR_ROLE",
                    format!("{} header is required", ACTOR_ROLE_HEADER),
                )),
            )
        })?;

        value
            .to_str()
            .map_err(|e| e.to_string())
            .and_then(|s| s.parse::<ActorRole>())
            .map(Actor)
            .map_err(|message| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::new("INVALID_ACTOR_ROLE", message)),
                )
            })
    }
}
