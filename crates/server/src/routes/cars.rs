use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use models::car::NewCar;
use service::car_service::{self, CarFilter, CarList, CarPage, UpdateCar};
use service::pagination::Pagination;

use crate::auth::{AuthUser, ServerState};
use crate::errors::JsonApiError;

/// Query string for the listing endpoints; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub status: Option<String>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub year: Option<i32>,
    pub mileage: Option<i64>,
    pub engine_capacity: Option<i32>,
    pub fuel: Option<String>,
    pub transmission: Option<String>,
    pub registered_in: Option<String>,
    pub assembly: Option<String>,
    pub body_type: Option<String>,
    pub color: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl ListQuery {
    fn filter(&self) -> CarFilter {
        CarFilter {
            status: self.status.clone(),
            name: self.name.clone(),
            price: self.price,
            year: self.year,
            mileage: self.mileage,
            engine_capacity: self.engine_capacity,
            fuel: self.fuel.clone(),
            transmission: self.transmission.clone(),
            registered_in: self.registered_in.clone(),
            assembly: self.assembly.clone(),
            body_type: self.body_type.clone(),
            color: self.color.clone(),
        }
    }

    fn pagination(&self) -> Pagination {
        Pagination::from_query(self.page, self.limit)
    }
}

/// `GET /cars` — the caller's own, still-active ads.
pub async fn list_cars(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Query(q): Query<ListQuery>,
) -> Result<Json<CarPage>, JsonApiError> {
    let page = car_service::list_active_cars(
        &state.db,
        user.user_id,
        &q.filter(),
        q.sort.as_deref(),
        q.pagination(),
    )
    .await?;
    Ok(Json(page))
}

/// `GET /cars/expired` — the caller's lapsed ads, unpaginated.
pub async fn expired_cars(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CarList>, JsonApiError> {
    let list = car_service::list_expired_cars(&state.db, user.user_id).await?;
    Ok(Json(list))
}

/// `GET /cars/all-ads` — public catalogue, no owner scoping, no expiry check.
pub async fn all_ads(
    State(state): State<ServerState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<CarPage>, JsonApiError> {
    let page = car_service::list_all_ads(&state.db, &q.filter(), q.sort.as_deref(), q.pagination()).await?;
    Ok(Json(page))
}

/// `GET /cars/:id`
pub async fn get_car(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, JsonApiError> {
    let car = car_service::get_car(&state.db, user.user_id, id).await?;
    Ok(Json(json!({ "car": car })))
}

/// `POST /cars`
pub async fn create_car(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<NewCar>,
) -> Result<(StatusCode, Json<Value>), JsonApiError> {
    let car = car_service::create_car(&state.db, user.user_id, input).await?;
    info!(id = %car.id, owner = %user.user_id, "ad posted");
    Ok((StatusCode::CREATED, Json(json!({ "car": car }))))
}

/// `PATCH /cars/:id`
pub async fn update_car(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCar>,
) -> Result<Json<Value>, JsonApiError> {
    let car = car_service::update_car(&state.db, user.user_id, id, input).await?;
    Ok(Json(json!({ "car": car })))
}

/// `DELETE /cars/:id` — 200 with empty body on success.
pub async fn delete_car(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    car_service::delete_car(&state.db, user.user_id, id).await?;
    Ok(StatusCode::OK)
}
