//! House context extractor.
//!
//! Every `/house/{name}/...` handler takes a [`HouseContext`]. It requires a
//! signed-in user, takes the already percent-decoded `{name}` path segment
//! and resolves it among the houses that user owns. Anything else is a 404,
//! including a house of the same name owned by somebody else.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::db::HouseRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireAuth;
use crate::models::{CurrentUser, House};
use crate::state::AppState;

/// Message returned when a house cannot be resolved.
pub const HOUSE_NOT_FOUND: &str = "Rumah tidak ditemukan";

/// The signed-in user together with the house named in the path.
#[derive(Debug, Clone)]
pub struct HouseContext {
    pub user: CurrentUser,
    pub house: House,
}

impl FromRequestParts<AppState> for HouseContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        let name = params
            .get("name")
            .ok_or_else(|| AppError::NotFound(HOUSE_NOT_FOUND.to_owned()))?;

        let houses = HouseRepository::new(state.pool());
        let house_id = houses
            .resolve(user.id, name)
            .await?
            .ok_or_else(|| AppError::NotFound(HOUSE_NOT_FOUND.to_owned()))?;
        let house = houses
            .get(house_id)
            .await?
            .ok_or_else(|| AppError::NotFound(HOUSE_NOT_FOUND.to_owned()))?;

        tracing::Span::current().record("house_id", house.id.as_i32());

        Ok(Self { user, house })
    }
}
