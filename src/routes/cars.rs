//! Car inventory routes (protected)
//!
//! - POST /add-car - Register a car owned by the caller
//! - GET  /cars    - List the caller's cars

use hyper::body::Body;
use hyper::{Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::require_claims;
use crate::db::{CarDoc, CarSummary};
use crate::routes::response::{json_response, parse_json_body, text_response, ResponseBody};
use crate::server::AppState;
use crate::types::ApiError;

#[derive(Debug, Deserialize)]
pub struct AddCarRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub price: Option<f64>,
}

impl AddCarRequest {
    /// Presence check; the owner comes from the token, never the body
    pub fn into_car(self, owner_email: String) -> Result<CarDoc, ApiError> {
        match (self.make, self.model, self.price) {
            (Some(make), Some(model), Some(price))
                if !make.trim().is_empty() && !model.trim().is_empty() =>
            {
                Ok(CarDoc::new(make, model, price, owner_email))
            }
            _ => Err(ApiError::Validation(
                "Missing required fields: make, model, price".into(),
            )),
        }
    }
}

/// POST /add-car
///
/// The token is checked before the body is read, so an unauthenticated
/// request never reaches the store.
pub async fn handle_add_car<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, ApiError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let claims = require_claims(req.headers(), &state.jwt)?;

    let body: AddCarRequest = parse_json_body(req).await?;
    let car = body.into_car(claims.email)?;

    info!("Adding car {} {} for {}", car.make, car.model, car.owner_email);
    state.cars.insert_car(car).await?;

    Ok(text_response(StatusCode::CREATED, "Car was added"))
}

/// GET /cars
pub async fn handle_list_cars<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, ApiError> {
    let claims = require_claims(req.headers(), &state.jwt)?;

    let cars: Vec<CarSummary> = state
        .cars
        .find_cars_by_owner(&claims.email)
        .await?
        .iter()
        .map(CarDoc::summary)
        .collect();

    Ok(json_response(StatusCode::OK, &cars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_taken_from_token() {
        let body: AddCarRequest = serde_json::from_str(
            r#"{"make":"Civic","model":"X","price":1000,"ownerEmail":"evil@x.com"}"#,
        )
        .unwrap();

        let car = body.into_car("a@x.com".into()).unwrap();
        assert_eq!(car.owner_email, "a@x.com");
        assert_eq!(car.price, 1000.0);
        assert!(!car.sold);
    }

    #[test]
    fn test_missing_price_rejected() {
        let body: AddCarRequest =
            serde_json::from_str(r#"{"make":"Civic","model":"X"}"#).unwrap();
        assert!(matches!(
            body.into_car("a@x.com".into()),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_string_price_is_a_json_error() {
        let result: Result<AddCarRequest, _> =
            serde_json::from_str(r#"{"make":"Civic","model":"X","price":"cheap"}"#);
        assert!(result.is_err());
    }
}
