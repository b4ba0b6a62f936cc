//! Database models
//!
//! Data structures representing database tables

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Vehicle categories a captain can register with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Bike,
    Truck,
    Van,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [
        VehicleType::Car,
        VehicleType::Bike,
        VehicleType::Truck,
        VehicleType::Van,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Bike => "bike",
            VehicleType::Truck => "truck",
            VehicleType::Van => "van",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown vehicle type: {}", s))
    }
}

impl ToSql for VehicleType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for VehicleType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str()?.parse().map_err(|_| FromSqlError::InvalidType)
    }
}

/// Captain's personal name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fullname {
    pub firstname: String,
    #[serde(default)]
    pub lastname: Option<String>,
}

/// Vehicle registered by a captain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub color: String,
    pub plate: String,
    pub capacity: u32,
    pub vehicle_type: VehicleType,
}

/// Captain record in the database
///
/// The password hash never leaves the process: it is skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Captain {
    pub id: String,
    pub fullname: Fullname,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub vehicle: Vehicle,
    pub created_at: String,
}

/// Validated registration fields, before an id and password hash are attached
#[derive(Debug, Clone, PartialEq)]
pub struct NewCaptain {
    pub fullname: Fullname,
    pub email: String,
    pub vehicle: Vehicle,
}

/// Blacklisted token record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistedToken {
    pub token: String,
    pub created_at: String,
    /// Unix timestamp after which the entry may be pruned
    pub expires_at: i64,
}
