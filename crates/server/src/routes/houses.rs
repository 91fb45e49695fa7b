//! Home page: the houses of the signed-in user.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use stock_home_core::{HouseName, HouseNameError};

use crate::db::{HouseRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::house::dashboard_path;
use crate::models::{CurrentUser, House, HouseSummary};
use crate::state::AppState;

/// Home page response.
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub user: CurrentUser,
    pub houses: Vec<HouseSummary>,
}

/// Create-house request body.
#[derive(Debug, Deserialize)]
pub struct CreateHouseRequest {
    pub name: String,
}

/// A newly created house.
#[derive(Debug, Serialize)]
pub struct CreatedHouse {
    #[serde(flatten)]
    pub house: House,
    pub dashboard_path: String,
}

pub(crate) fn house_name_message(err: &HouseNameError) -> String {
    match err {
        HouseNameError::Empty => "Nama rumah wajib diisi".to_owned(),
        HouseNameError::TooLong { max } => format!("Nama rumah maksimal {max} karakter"),
        HouseNameError::InvalidCharacter => "Nama rumah mengandung karakter tidak valid".to_owned(),
    }
}

/// List the houses the user owns or belongs to.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<HomeResponse>> {
    let houses = HouseRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(HomeResponse { user, houses }))
}

/// Create a house owned by the user, who becomes its admin.
///
/// # Errors
///
/// Returns `400` for an invalid name and `409` if the user already owns a
/// house with that name.
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateHouseRequest>,
) -> Result<(StatusCode, Json<CreatedHouse>)> {
    let name = HouseName::parse(&body.name).map_err(|e| AppError::BadRequest(house_name_message(&e)))?;

    let house = HouseRepository::new(state.pool())
        .create(user.id, &name)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict(format!("Rumah \"{name}\" sudah ada"))
            }
            other => other.into(),
        })?;

    tracing::info!(house_id = %house.id, owner_id = %user.id, "house created");

    let dashboard_path = dashboard_path(&house.name);
    Ok((
        StatusCode::CREATED,
        Json(CreatedHouse {
            house,
            dashboard_path,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_house_name_messages() {
        assert_eq!(house_name_message(&HouseNameError::Empty), "Nama rumah wajib diisi");
        assert_eq!(
            house_name_message(&HouseNameError::TooLong { max: 100 }),
            "Nama rumah maksimal 100 karakter"
        );
    }
}
