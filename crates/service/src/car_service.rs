//! The listing engine: filter construction, sorting, pagination, and the
//! ad lifecycle rules (owner scoping, expiry, delete cooldown).

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::car::{self, AD_LIFETIME_SECS};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Optional filters for the listing endpoints. Numeric filters are inclusive
/// upper bounds; `name` is a case-insensitive substring match; the rest are
/// exact matches.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarFilter {
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
}

impl CarFilter {
    /// Build the AND-condition from whichever filters are present.
    pub fn to_condition(&self) -> Condition {
        let mut cond = Condition::all();
        if let Some(status) = &self.status {
            cond = cond.add(car::Column::Status.eq(status.clone()));
        }
        if let Some(name) = &self.name {
            cond = cond.add(Expr::col((car::Entity, car::Column::Name)).ilike(format!("%{}%", name)));
        }
        if let Some(price) = self.price {
            cond = cond.add(car::Column::Price.lte(price));
        }
        if let Some(year) = self.year {
            cond = cond.add(car::Column::Year.lte(year));
        }
        if let Some(mileage) = self.mileage {
            cond = cond.add(car::Column::Mileage.lte(mileage));
        }
        if let Some(engine_capacity) = self.engine_capacity {
            cond = cond.add(car::Column::EngineCapacity.lte(engine_capacity));
        }
        if let Some(fuel) = &self.fuel {
            cond = cond.add(car::Column::Fuel.eq(fuel.clone()));
        }
        if let Some(transmission) = &self.transmission {
            cond = cond.add(car::Column::Transmission.eq(transmission.clone()));
        }
        if let Some(registered_in) = &self.registered_in {
            cond = cond.add(car::Column::RegisteredIn.eq(registered_in.clone()));
        }
        if let Some(assembly) = &self.assembly {
            cond = cond.add(car::Column::Assembly.eq(assembly.clone()));
        }
        if let Some(body_type) = &self.body_type {
            cond = cond.add(car::Column::BodyType.eq(body_type.clone()));
        }
        if let Some(color) = &self.color {
            cond = cond.add(car::Column::Color.eq(color.clone()));
        }
        cond
    }
}

/// Partial update payload. Omitted fields keep their stored values; string
/// fields present as `""` are rejected before any query runs.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCar {
    pub name: Option<String>,
    pub description: Option<String>,
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
    pub status: Option<String>,
    pub features: Option<car::Features>,
}

impl UpdateCar {
    /// Empty string is a distinct invalid state from omission.
    fn reject_empty_strings(&self) -> Result<(), ServiceError> {
        let text_fields = [
            &self.name,
            &self.description,
            &self.fuel,
            &self.transmission,
            &self.registered_in,
            &self.assembly,
            &self.body_type,
            &self.color,
            &self.status,
        ];
        if text_fields.iter().any(|f| matches!(f, Some(v) if v.is_empty())) {
            return Err(ServiceError::BadRequest("all fields must be filled out".into()));
        }
        Ok(())
    }

    /// Re-run the schema constraints on whichever fields are present.
    fn validate(&self) -> Result<(), ServiceError> {
        if let Some(name) = &self.name {
            car::validate_name(name)?;
        }
        if let Some(fuel) = &self.fuel {
            car::validate_fuel(fuel)?;
        }
        if let Some(transmission) = &self.transmission {
            car::validate_transmission(transmission)?;
        }
        if let Some(assembly) = &self.assembly {
            car::validate_assembly(assembly)?;
        }
        if let Some(body_type) = &self.body_type {
            car::validate_body_type(body_type)?;
        }
        if let Some(status) = &self.status {
            car::validate_status(status)?;
        }
        Ok(())
    }
}

/// A page of ads plus the totals the catalogue UI renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarPage {
    pub cars: Vec<car::Model>,
    pub count: usize,
    pub num_of_pages: u64,
}

/// The expired view is deliberately flat: no filters, no pagination.
#[derive(Debug, Serialize)]
pub struct CarList {
    pub cars: Vec<car::Model>,
    pub count: usize,
}

fn db_err(e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

fn not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("no ad with id {}", id))
}

/// Mutations and by-id reads always pair the id with the owner in one
/// predicate, so a non-owner can never hit a matching row.
fn owner_scope(id: Uuid, owner: Uuid) -> Condition {
    Condition::all()
        .add(car::Column::Id.eq(id))
        .add(car::Column::CreatedBy.eq(owner))
}

fn sort_column(field: &str) -> Option<car::Column> {
    match field {
        "name" => Some(car::Column::Name),
        "price" => Some(car::Column::Price),
        "year" => Some(car::Column::Year),
        "mileage" => Some(car::Column::Mileage),
        "engineCapacity" => Some(car::Column::EngineCapacity),
        "fuel" => Some(car::Column::Fuel),
        "transmission" => Some(car::Column::Transmission),
        "registeredIn" => Some(car::Column::RegisteredIn),
        "assembly" => Some(car::Column::Assembly),
        "bodyType" => Some(car::Column::BodyType),
        "color" => Some(car::Column::Color),
        "status" => Some(car::Column::Status),
        "expiryDate" => Some(car::Column::ExpiryDate),
        "createdAt" => Some(car::Column::CreatedAt),
        "updatedAt" => Some(car::Column::UpdatedAt),
        _ => None,
    }
}

/// Apply a comma-separated sort spec (`-` prefix = descending). Unknown
/// fields are ignored; when nothing applies, newest-first is the default.
pub fn apply_sort(mut select: Select<car::Entity>, sort: Option<&str>) -> Select<car::Entity> {
    let mut applied = false;
    if let Some(spec) = sort {
        for raw in spec.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let (field, order) = match raw.strip_prefix('-') {
                Some(rest) => (rest, Order::Desc),
                None => (raw, Order::Asc),
            };
            if let Some(col) = sort_column(field) {
                select = select.order_by(col, order);
                applied = true;
            }
        }
    }
    if !applied {
        select = select.order_by(car::Column::CreatedAt, Order::Desc);
    }
    select
}

async fn fetch_page(
    db: &DatabaseConnection,
    cond: Condition,
    sort: Option<&str>,
    pagination: Pagination,
) -> Result<CarPage, ServiceError> {
    let (page_idx, limit) = pagination.normalize();
    let select = apply_sort(car::Entity::find().filter(cond), sort);
    let paginator = select.paginate(db, limit);
    let num_of_pages = paginator.num_pages().await.map_err(db_err)?;
    let cars = paginator.fetch_page(page_idx).await.map_err(db_err)?;
    Ok(CarPage { count: cars.len(), cars, num_of_pages })
}

/// Owner's default view: their own ads whose expiry is still in the future.
pub async fn list_active_cars(
    db: &DatabaseConnection,
    owner: Uuid,
    filter: &CarFilter,
    sort: Option<&str>,
    pagination: Pagination,
) -> Result<CarPage, ServiceError> {
    let cond = Condition::all()
        .add(car::Column::CreatedBy.eq(owner))
        .add(car::Column::ExpiryDate.gt(Utc::now()))
        .add(filter.to_condition());
    fetch_page(db, cond, sort, pagination).await
}

/// Owner's expired ads, full set with a count.
pub async fn list_expired_cars(db: &DatabaseConnection, owner: Uuid) -> Result<CarList, ServiceError> {
    let cond = Condition::all()
        .add(car::Column::CreatedBy.eq(owner))
        .add(car::Column::ExpiryDate.lte(Utc::now()));
    let cars = car::Entity::find().filter(cond).all(db).await.map_err(db_err)?;
    Ok(CarList { count: cars.len(), cars })
}

/// Public catalogue: every ad regardless of owner or expiry state.
pub async fn list_all_ads(
    db: &DatabaseConnection,
    filter: &CarFilter,
    sort: Option<&str>,
    pagination: Pagination,
) -> Result<CarPage, ServiceError> {
    fetch_page(db, filter.to_condition(), sort, pagination).await
}

pub async fn get_car(db: &DatabaseConnection, owner: Uuid, id: Uuid) -> Result<car::Model, ServiceError> {
    car::Entity::find()
        .filter(owner_scope(id, owner))
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found(id))
}

#[instrument(skip(db, input), fields(owner = %owner))]
pub async fn create_car(
    db: &DatabaseConnection,
    owner: Uuid,
    input: car::NewCar,
) -> Result<car::Model, ServiceError> {
    let created = car::create(db, owner, input).await?;
    info!(id = %created.id, owner = %owner, expiry = %created.expiry_date, "ad created");
    Ok(created)
}

/// Apply a partial update as a single UPDATE filtered on id AND owner.
/// Expiry is never touched here.
pub async fn update_car(
    db: &DatabaseConnection,
    owner: Uuid,
    id: Uuid,
    input: UpdateCar,
) -> Result<car::Model, ServiceError> {
    input.reject_empty_strings()?;
    input.validate()?;

    let mut am = car::ActiveModel { ..Default::default() };
    if let Some(v) = input.name { am.name = Set(v); }
    if let Some(v) = input.description { am.description = Set(v); }
    if let Some(v) = input.price { am.price = Set(v); }
    if let Some(v) = input.year { am.year = Set(v); }
    if let Some(v) = input.mileage { am.mileage = Set(v); }
    if let Some(v) = input.engine_capacity { am.engine_capacity = Set(v); }
    if let Some(v) = input.fuel { am.fuel = Set(v); }
    if let Some(v) = input.transmission { am.transmission = Set(v); }
    if let Some(v) = input.registered_in { am.registered_in = Set(v); }
    if let Some(v) = input.assembly { am.assembly = Set(v); }
    if let Some(v) = input.body_type { am.body_type = Set(v); }
    if let Some(v) = input.color { am.color = Set(v); }
    if let Some(v) = input.status { am.status = Set(v); }
    if let Some(v) = input.features { am.features = Set(v); }
    am.updated_at = Set(Utc::now().into());

    let mut updated = car::Entity::update_many()
        .set(am)
        .filter(owner_scope(id, owner))
        .exec_with_returning(db)
        .await
        .map_err(db_err)?;
    updated.pop().ok_or_else(|| not_found(id))
}

/// Seconds the owner still has to wait before the ad may be deleted.
pub fn cooldown_remaining_secs(created_at: sea_orm::prelude::DateTimeWithTimeZone, now: DateTime<Utc>) -> i64 {
    AD_LIFETIME_SECS - now.signed_duration_since(created_at).num_seconds()
}

#[instrument(skip(db), fields(owner = %owner, id = %id))]
pub async fn delete_car(db: &DatabaseConnection, owner: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let existing = car::Entity::find()
        .filter(owner_scope(id, owner))
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| not_found(id))?;

    let remaining = cooldown_remaining_secs(existing.created_at, Utc::now());
    if remaining > 0 {
        return Err(ServiceError::Unauthorized(
            "you can only delete your ad one hour after posting it".into(),
        ));
    }

    car::Entity::delete_many()
        .filter(owner_scope(id, owner))
        .exec(db)
        .await
        .map_err(db_err)?;
    info!(id = %id, owner = %owner, "ad deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DbBackend, QueryFilter, QueryTrait};

    fn sql(select: Select<car::Entity>) -> String {
        select.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn numeric_filters_are_upper_bounds() {
        let filter = CarFilter { price: Some(5000), mileage: Some(90000), ..CarFilter::default() };
        let q = sql(car::Entity::find().filter(filter.to_condition()));
        assert!(q.contains(r#""car"."price" <= 5000"#), "{}", q);
        assert!(q.contains(r#""car"."mileage" <= 90000"#), "{}", q);
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let filter = CarFilter { name: Some("civic".into()), ..CarFilter::default() };
        let q = sql(car::Entity::find().filter(filter.to_condition()));
        assert!(q.contains("ILIKE"), "{}", q);
        assert!(q.contains("%civic%"), "{}", q);
    }

    #[test]
    fn exact_filters_render_as_equality() {
        let filter = CarFilter {
            fuel: Some("petrol".into()),
            body_type: Some("SUV".into()),
            ..CarFilter::default()
        };
        let q = sql(car::Entity::find().filter(filter.to_condition()));
        assert!(q.contains(r#""car"."fuel" = 'petrol'"#), "{}", q);
        assert!(q.contains(r#""car"."body_type" = 'SUV'"#), "{}", q);
    }

    #[test]
    fn empty_filter_adds_no_predicates() {
        let q = sql(car::Entity::find().filter(CarFilter::default().to_condition()));
        assert!(!q.contains("WHERE"), "{}", q);
    }

    #[test]
    fn active_listing_scopes_owner_and_expiry() {
        let owner = Uuid::new_v4();
        let cond = Condition::all()
            .add(car::Column::CreatedBy.eq(owner))
            .add(car::Column::ExpiryDate.gt(Utc::now()));
        let q = sql(car::Entity::find().filter(cond));
        assert!(q.contains(r#""car"."created_by" ="#), "{}", q);
        assert!(q.contains(r#""car"."expiry_date" >"#), "{}", q);
    }

    #[test]
    fn sort_spec_maps_prefix_to_direction() {
        let q = sql(apply_sort(car::Entity::find(), Some("-price,year")));
        assert!(q.contains(r#"ORDER BY "car"."price" DESC, "car"."year" ASC"#), "{}", q);
    }

    #[test]
    fn unknown_sort_fields_fall_back_to_newest_first() {
        let q = sql(apply_sort(car::Entity::find(), Some("horsepower")));
        assert!(q.contains(r#"ORDER BY "car"."created_at" DESC"#), "{}", q);
    }

    #[test]
    fn not_found_error_names_the_ad_id() {
        let id = Uuid::new_v4();
        match not_found(id) {
            ServiceError::NotFound(msg) => assert!(msg.contains(&id.to_string()), "{}", msg),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn default_sort_is_newest_first() {
        let q = sql(apply_sort(car::Entity::find(), None));
        assert!(q.contains(r#"ORDER BY "car"."created_at" DESC"#), "{}", q);
    }

    #[test]
    fn owner_scope_pairs_id_and_owner() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let q = sql(car::Entity::find().filter(owner_scope(id, owner)));
        assert!(q.contains(r#""car"."id" ="#), "{}", q);
        assert!(q.contains(r#""car"."created_by" ="#), "{}", q);
    }

    #[test]
    fn empty_string_update_is_rejected() {
        let input = UpdateCar { color: Some(String::new()), ..UpdateCar::default() };
        match input.reject_empty_strings() {
            Err(ServiceError::BadRequest(_)) => {}
            other => panic!("expected BadRequest, got {:?}", other.err()),
        }
    }

    #[test]
    fn omitted_fields_pass_the_empty_check() {
        let input = UpdateCar { price: Some(4000), ..UpdateCar::default() };
        assert!(input.reject_empty_strings().is_ok());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn update_revalidates_enum_fields() {
        let input = UpdateCar { fuel: Some("diesel".into()), ..UpdateCar::default() };
        assert!(input.validate().is_err());
    }

    #[test]
    fn cooldown_blocks_within_the_hour() {
        let created: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let now = Utc::now() + Duration::minutes(59);
        assert!(cooldown_remaining_secs(created, now) > 0);
    }

    #[test]
    fn cooldown_clears_after_the_hour() {
        let created: sea_orm::prelude::DateTimeWithTimeZone =
            (Utc::now() - Duration::seconds(AD_LIFETIME_SECS + 1)).into();
        assert!(cooldown_remaining_secs(created, Utc::now()) <= 0);
    }

    #[test]
    fn filter_query_keys_are_camel_case() {
        let filter: CarFilter =
            serde_json::from_str(r#"{"bodyType":"SUV","registeredIn":"Lahore","engineCapacity":1600}"#).unwrap();
        assert_eq!(filter.body_type.as_deref(), Some("SUV"));
        assert_eq!(filter.registered_in.as_deref(), Some("Lahore"));
        assert_eq!(filter.engine_capacity, Some(1600));
    }
}
