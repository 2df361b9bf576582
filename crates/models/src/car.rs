use sea_orm::{entity::prelude::*, Set, DatabaseConnection, FromJsonQueryResult};
use uuid::Uuid;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::user;

/// An ad lives for one hour; the same window doubles as the delete cooldown.
pub const AD_LIFETIME_SECS: i64 = 3600;

pub const MAX_NAME_LEN: usize = 100;

pub const FUEL_TYPES: [&str; 3] = ["petrol", "gasoline", "electric"];
pub const TRANSMISSIONS: [&str; 2] = ["manual", "automatic"];
pub const ASSEMBLIES: [&str; 2] = ["local", "imported"];
pub const BODY_TYPES: [&str; 10] = [
    "City car", "Supermini", "Hatchback", "MPV", "Saloon",
    "Estate", "Coupe", "Crossover", "SUV", "Cabriolet",
];
pub const STATUSES: [&str; 2] = ["available", "purchased"];
pub const STATUS_AVAILABLE: &str = "available";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "car")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub year: i32,
    pub mileage: i64,
    pub engine_capacity: i32,
    pub fuel: String,
    pub transmission: String,
    pub registered_in: String,
    pub assembly: String,
    pub body_type: String,
    pub color: String,
    pub status: String,
    pub expiry_date: DateTimeWithTimeZone,
    pub created_by: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub features: Features,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// Equipment flags carried on every ad; all default to false.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    pub abs: bool,
    pub am_fm_radio: bool,
    pub air_bags: bool,
    pub air_conditioning: bool,
    pub alloy_rims: bool,
    pub cd_player: bool,
    pub immobilizer_key: bool,
    pub keyless_entry: bool,
    pub power_locks: bool,
    pub power_mirrors: bool,
    pub power_steering: bool,
    pub power_windows: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity)
                .from(Column::CreatedBy)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Incoming ad payload. Owner and expiry are never taken from the client;
/// unknown fields (including any client-supplied `expiryDate`) are dropped
/// during deserialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub year: i32,
    pub mileage: i64,
    pub engine_capacity: i32,
    pub fuel: String,
    pub transmission: String,
    pub registered_in: String,
    pub assembly: String,
    pub body_type: String,
    pub color: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub features: Option<Features>,
}

fn validate_in_set(field: &str, value: &str, allowed: &[&str]) -> Result<(), ModelError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ModelError::Validation(format!(
            "invalid {}: {:?} (expected one of {})",
            field,
            value,
            allowed.join(", ")
        )))
    }
}

fn validate_required_text(field: &str, value: &str) -> Result<(), ModelError> {
    if value.trim().is_empty() {
        return Err(ModelError::Validation(format!("please provide vehicle {}", field)));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    validate_required_text("name", name)?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ModelError::Validation(format!("name must be at most {} characters", MAX_NAME_LEN)));
    }
    Ok(())
}

pub fn validate_fuel(fuel: &str) -> Result<(), ModelError> {
    validate_in_set("fuel", fuel, &FUEL_TYPES)
}

pub fn validate_transmission(transmission: &str) -> Result<(), ModelError> {
    validate_in_set("transmission", transmission, &TRANSMISSIONS)
}

pub fn validate_assembly(assembly: &str) -> Result<(), ModelError> {
    validate_in_set("assembly", assembly, &ASSEMBLIES)
}

pub fn validate_body_type(body_type: &str) -> Result<(), ModelError> {
    validate_in_set("bodyType", body_type, &BODY_TYPES)
}

pub fn validate_status(status: &str) -> Result<(), ModelError> {
    validate_in_set("status", status, &STATUSES)
}

/// Check every schema constraint, failing on the first invalid field.
pub fn validate_new(input: &NewCar) -> Result<(), ModelError> {
    validate_name(&input.name)?;
    validate_required_text("description", &input.description)?;
    validate_fuel(&input.fuel)?;
    validate_transmission(&input.transmission)?;
    validate_required_text("registration location", &input.registered_in)?;
    validate_assembly(&input.assembly)?;
    validate_body_type(&input.body_type)?;
    validate_required_text("color", &input.color)?;
    if let Some(status) = &input.status {
        validate_status(status)?;
    }
    Ok(())
}

/// Insert a new ad. Expiry is fixed server-side at creation time + 1 hour
/// and is never recomputed afterwards.
pub async fn create(db: &DatabaseConnection, created_by: Uuid, input: NewCar) -> Result<Model, ModelError> {
    validate_new(&input)?;
    let now = Utc::now();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        description: Set(input.description),
        price: Set(input.price),
        year: Set(input.year),
        mileage: Set(input.mileage),
        engine_capacity: Set(input.engine_capacity),
        fuel: Set(input.fuel),
        transmission: Set(input.transmission),
        registered_in: Set(input.registered_in),
        assembly: Set(input.assembly),
        body_type: Set(input.body_type),
        color: Set(input.color),
        status: Set(input.status.unwrap_or_else(|| STATUS_AVAILABLE.to_string())),
        expiry_date: Set((now + Duration::seconds(AD_LIFETIME_SECS)).into()),
        created_by: Set(created_by),
        features: Set(input.features.unwrap_or_default()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> NewCar {
        NewCar {
            name: "Honda Civic".into(),
            description: "Clean single-owner car".into(),
            price: 15000,
            year: 2018,
            mileage: 42000,
            engine_capacity: 1800,
            fuel: "petrol".into(),
            transmission: "automatic".into(),
            registered_in: "Lahore".into(),
            assembly: "imported".into(),
            body_type: "Saloon".into(),
            color: "white".into(),
            status: None,
            features: None,
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(validate_new(&sample_input()).is_ok());
    }

    #[test]
    fn fuel_outside_closed_set_is_rejected() {
        let mut input = sample_input();
        input.fuel = "diesel".into();
        let err = validate_new(&input).unwrap_err();
        assert!(err.to_string().contains("fuel"));
    }

    #[test]
    fn body_type_is_case_sensitive() {
        let mut input = sample_input();
        input.body_type = "saloon".into();
        assert!(validate_new(&input).is_err());
    }

    #[test]
    fn over_long_name_is_rejected() {
        let mut input = sample_input();
        input.name = "x".repeat(MAX_NAME_LEN + 1);
        assert!(validate_new(&input).is_err());
    }

    #[test]
    fn first_invalid_field_wins() {
        let mut input = sample_input();
        input.description = "".into();
        input.fuel = "coal".into();
        let err = validate_new(&input).unwrap_err();
        assert!(err.to_string().contains("description"));
    }

    #[test]
    fn features_default_to_all_false() {
        let f = Features::default();
        assert!(!f.abs && !f.power_windows && !f.keyless_entry);
    }

    #[test]
    fn features_wire_format_is_camel_case() {
        let f = Features { am_fm_radio: true, ..Features::default() };
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["amFmRadio"], true);
        assert_eq!(json["powerSteering"], false);
    }

    #[test]
    fn new_car_ignores_client_supplied_expiry() {
        let json = serde_json::json!({
            "name": "Swift", "description": "d", "price": 1, "year": 2020,
            "mileage": 1, "engineCapacity": 1300, "fuel": "petrol",
            "transmission": "manual", "registeredIn": "Karachi",
            "assembly": "local", "bodyType": "Hatchback", "color": "red",
            "expiryDate": "2099-01-01T00:00:00Z", "createdBy": "not-a-uuid"
        });
        let parsed: NewCar = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.name, "Swift");
    }
}
