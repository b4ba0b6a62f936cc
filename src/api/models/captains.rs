use crate::api::validation::{self, as_positive_integer, as_text, lookup, LOGIN_RULES, REGISTER_RULES};
use crate::core::error::{BackendError, Result};
use crate::db::models::{Captain, Fullname, NewCaptain, Vehicle};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Captain API models

/// Validated body of `POST /captains/register`
#[derive(Debug)]
pub struct RegisterRequest {
    pub captain: NewCaptain,
    pub password: String,
}

impl RegisterRequest {
    /// Validate a raw JSON body and convert it into typed registration fields
    pub fn from_body(body: &Value) -> Result<Self> {
        validation::validate(body, REGISTER_RULES)?;

        let vehicle = Vehicle {
            color: required_text(body, "vehicle.color")?,
            plate: required_text(body, "vehicle.plate")?,
            capacity: lookup(body, "vehicle.capacity")
                .and_then(as_positive_integer)
                .ok_or_else(|| malformed("vehicle.capacity"))?,
            vehicle_type: lookup(body, "vehicle.type")
                .and_then(validation::vehicle_type)
                .ok_or_else(|| malformed("vehicle.type"))?,
        };

        Ok(Self {
            captain: NewCaptain {
                fullname: Fullname {
                    firstname: required_text(body, "fullname.firstname")?,
                    lastname: lookup(body, "fullname.lastname")
                        .and_then(as_text)
                        .filter(|s| !s.trim().is_empty()),
                },
                email: required_text(body, "email")?,
                vehicle,
            },
            password: required_text(body, "password")?,
        })
    }
}

/// Validated body of `POST /captains/login`
#[derive(Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_body(body: &Value) -> Result<Self> {
        validation::validate(body, LOGIN_RULES)?;

        Ok(Self {
            email: required_text(body, "email")?,
            password: required_text(body, "password")?,
        })
    }
}

/// Response for register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub captain: Captain,
}

/// Response for the profile endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub captain: Captain,
}

/// Plain message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn required_text(body: &Value, path: &str) -> Result<String> {
    lookup(body, path).and_then(as_text).ok_or_else(|| malformed(path))
}

fn malformed(path: &str) -> BackendError {
    BackendError::InvalidRequest(format!("Malformed field: {}", path))
}
