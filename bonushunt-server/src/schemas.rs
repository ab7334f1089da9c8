//! Request bodies accepted by the endpoints, validated on extraction

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginSchema {
    #[validate(length(max = 128))]
    pub username: String,
    #[validate(length(max = 64))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterSchema {
    #[validate(length(min = 2, max = 128))]
    pub display_name: String,
    #[validate(length(min = 2, max = 128))]
    pub username: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewHuntSchema {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 128))]
    pub casino: String,
    #[validate(length(min = 1, max = 8))]
    pub currency: String,
    #[validate(range(min = 0.0))]
    pub start_balance: f64,
    pub notes: Option<String>,
    /// Public by default, for live hunts
    pub is_public: Option<bool>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateHuntSchema {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub casino: Option<String>,
    #[validate(length(min = 1, max = 8))]
    pub currency: Option<String>,
    #[validate(range(min = 0.0))]
    pub start_balance: Option<f64>,
    #[validate(range(min = 0.0))]
    pub end_balance: Option<f64>,
    pub notes: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBonusSchema {
    #[validate(length(min = 1, max = 200))]
    pub slot_name: String,
    #[validate(length(min = 1, max = 128))]
    pub provider: String,
    pub image_url: Option<String>,
    /// A bonus can't be bought for free
    #[validate(range(min = 0.01))]
    pub bet_amount: f64,
    pub sort_order: i32,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateBonusSchema {
    #[validate(length(min = 1, max = 200))]
    pub slot_name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub provider: Option<String>,
    pub image_url: Option<String>,
    #[validate(range(min = 0.01))]
    pub bet_amount: Option<f64>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, ToSchema, Validate, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PayoutSchema {
    #[validate(range(min = 0.0))]
    pub win_amount: f64,
}

pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extracted_json: Json<T> = Json::from_request(req, state)
            .await
            .map_err(|_| (StatusCode::BAD_REQUEST, "JSON parse failed"))?;

        extracted_json
            .0
            .validate()
            .map_err(|_| (StatusCode::BAD_REQUEST, "Request body is invalid"))?;

        Ok(Self(extracted_json.0))
    }
}
