//! Fundraising campaigns.

use axum::{
    Json,
    extract::{Path, State},
};
use bson::{Bson, Document, oid::ObjectId};
use chrono::{DateTime, Utc};
use pet_buddy_core::Amount;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::{campaign_oid, check_claimed_email, path_email};
use crate::db::CampaignRepository;
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{CurrentUser, ensure_owner, ensure_owner_or_admin};
use crate::models::{
    CampaignDoc, CampaignView, DeleteOutcome, InsertOutcome, Timestamp, UpdateOutcome,
    campaign::PROTECTED_FIELDS, json_to_document,
};
use crate::state::AppState;

/// Typed campaign fields a client may set, validated before they reach the
/// store so stored documents stay readable.
#[derive(Debug, Default)]
struct CampaignFields {
    target_amount: Option<f64>,
    paused: Option<bool>,
    date: Option<Timestamp>,
}

impl CampaignFields {
    fn take(body: &mut Map<String, Value>) -> Result<Self> {
        let target_amount = body
            .remove("targetAmount")
            .filter(|v| !v.is_null())
            .map(|v| {
                Amount::from_json(&v)
                    .and_then(|a| a.to_f64())
                    .map_err(|_| AppError::BadRequest("Invalid target amount".to_owned()))
            })
            .transpose()?;

        let paused = match body.remove("paused") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(b),
            Some(_) => return Err(AppError::BadRequest("paused must be a boolean".to_owned())),
        };

        let date = match body.remove("date") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(
                DateTime::parse_from_rfc3339(&s)
                    .map(|dt| Timestamp(dt.with_timezone(&Utc)))
                    .map_err(|_| AppError::BadRequest("Invalid date".to_owned()))?,
            ),
            Some(_) => return Err(AppError::BadRequest("Invalid date".to_owned())),
        };

        Ok(Self {
            target_amount,
            paused,
            date,
        })
    }

    fn into_set(self, set: &mut Document) {
        if let Some(target) = self.target_amount {
            set.insert("targetAmount", target);
        }
        if let Some(paused) = self.paused {
            set.insert("paused", paused);
        }
        if let Some(date) = self.date {
            set.insert("date", Bson::DateTime(bson::DateTime::from_chrono(date.0)));
        }
    }
}

async fn load(state: &AppState, raw_id: &str) -> Result<(ObjectId, CampaignDoc)> {
    let id = campaign_oid(raw_id)?;
    let campaign = CampaignRepository::new(state.db())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_owned()))?;
    Ok((id, campaign))
}

/// `POST /campaigns`: start a campaign owned by the caller.
#[instrument(skip(state, identity, body))]
pub async fn create(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Json<InsertOutcome>> {
    check_claimed_email(&mut body, "userEmail", &identity)?;
    let fields = CampaignFields::take(&mut body)?;

    let campaign = CampaignDoc {
        id: None,
        user_email: identity.email.to_string(),
        target_amount: fields.target_amount.unwrap_or_default(),
        donated_amount: 0.0,
        paused: fields.paused.unwrap_or(false),
        date: Some(fields.date.unwrap_or_else(Timestamp::now)),
        extra: json_to_document(body, PROTECTED_FIELDS)?,
    };
    let outcome = CampaignRepository::new(state.db()).create(&campaign).await?;
    info!(owner = %identity.email, campaign_id = %outcome.inserted_id, "Started campaign");
    Ok(Json(outcome))
}

/// `GET /campaigns/available`: every campaign, newest first.
#[instrument(skip(state))]
pub async fn available(State(state): State<AppState>) -> Result<Json<Vec<CampaignView>>> {
    let campaigns = CampaignRepository::new(state.db()).list_all().await?;
    Ok(Json(campaigns.into_iter().map(CampaignView::from).collect()))
}

/// `GET /campaigns/{id}`.
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CampaignView>> {
    let (_, campaign) = load(&state, &id).await?;
    Ok(Json(campaign.into()))
}

/// `PUT /campaigns/{id}`: overwrite the supplied fields.
#[instrument(skip(state, identity, body))]
pub async fn update(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Json<UpdateOutcome>> {
    let (id, campaign) = load(&state, &id).await?;
    ensure_owner_or_admin(&state, &identity, &campaign.user_email).await?;

    let typed = CampaignFields::take(&mut body)?;
    let mut fields = json_to_document(body, PROTECTED_FIELDS)?;
    typed.into_set(&mut fields);
    if fields.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_owned()));
    }

    let outcome = CampaignRepository::new(state.db())
        .update_fields(id, fields)
        .await?;
    Ok(Json(outcome))
}

/// `GET /campaigns/user/{email}`: the caller's own campaigns.
#[instrument(skip(state, identity))]
pub async fn for_owner(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<CampaignView>>> {
    ensure_owner(&identity, &email)?;
    let email = path_email(&email)?;
    let campaigns = CampaignRepository::new(state.db())
        .list_by_owner(&email)
        .await?;
    Ok(Json(campaigns.into_iter().map(CampaignView::from).collect()))
}

/// `DELETE /campaigns/{id}`.
#[instrument(skip(state, identity))]
pub async fn delete(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>> {
    let (id, campaign) = load(&state, &id).await?;
    ensure_owner_or_admin(&state, &identity, &campaign.user_email).await?;
    let outcome = CampaignRepository::new(state.db()).delete(id).await?;
    info!(campaign_id = %id, "Deleted campaign");
    Ok(Json(outcome))
}

/// `PATCH /campaigns/donate/{id}`: add a positive amount to the total.
#[instrument(skip(state, _identity, body))]
pub async fn donate(
    CurrentUser(_identity): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Map<String, Value>>,
) -> Result<Json<UpdateOutcome>> {
    let amount = donation_amount(&body)?;
    let id = campaign_oid(&id)?;

    let outcome = CampaignRepository::new(state.db())
        .add_donation(id, amount)
        .await?;
    if outcome.matched_count == 0 {
        return Err(AppError::NotFound("Campaign not found".to_owned()));
    }
    Ok(Json(outcome))
}

/// `PATCH /campaigns/pause/{id}`: pause or resume.
#[instrument(skip(state, identity, body))]
pub async fn pause(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Map<String, Value>>,
) -> Result<Json<UpdateOutcome>> {
    let Some(paused) = body.get("paused").and_then(Value::as_bool) else {
        return Err(AppError::BadRequest("paused must be a boolean".to_owned()));
    };
    let (id, campaign) = load(&state, &id).await?;
    ensure_owner_or_admin(&state, &identity, &campaign.user_email).await?;

    let outcome = CampaignRepository::new(state.db())
        .set_paused(id, paused)
        .await?;
    info!(campaign_id = %id, paused, "Campaign pause state set");
    Ok(Json(outcome))
}

/// The positive `amount` of a donation body, as stored.
pub(crate) fn donation_amount(body: &Map<String, Value>) -> Result<f64> {
    body.get("amount")
        .ok_or(pet_buddy_core::AmountError::NotNumeric)
        .and_then(Amount::from_json)
        .and_then(|a| a.to_f64())
        .map_err(|_| AppError::BadRequest("Invalid donation amount".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::test_support::{OTHER_EMAIL, OWNER_TOKEN, send};

    fn object(value: Value) -> Map<String, Value> {
        let Value::Object(map) = value else {
            unreachable!()
        };
        map
    }

    #[test]
    fn test_campaign_fields_validation() {
        let mut body = object(json!({
            "targetAmount": "250",
            "paused": true,
            "date": "2024-02-01T00:00:00Z",
            "petName": "Rex",
        }));
        let fields = CampaignFields::take(&mut body).unwrap();
        assert!((fields.target_amount.unwrap() - 250.0).abs() < f64::EPSILON);
        assert_eq!(fields.paused, Some(true));
        assert!(fields.date.is_some());
        assert_eq!(body.len(), 1);

        let mut set = Document::new();
        fields.into_set(&mut set);
        assert!(set.get_datetime("date").is_ok());
        assert!(set.get_bool("paused").unwrap());

        assert!(CampaignFields::take(&mut object(json!({"targetAmount": "lots"}))).is_err());
        assert!(CampaignFields::take(&mut object(json!({"targetAmount": -1}))).is_err());
        assert!(CampaignFields::take(&mut object(json!({"paused": "yes"}))).is_err());
        assert!(CampaignFields::take(&mut object(json!({"date": "tomorrow"}))).is_err());
        assert!(CampaignFields::take(&mut object(json!({"date": 5}))).is_err());
    }

    #[test]
    fn test_donation_amount() {
        assert!((donation_amount(&object(json!({"amount": 5}))).unwrap() - 5.0).abs() < f64::EPSILON);
        assert!(
            (donation_amount(&object(json!({"amount": "7.25"}))).unwrap() - 7.25).abs()
                < f64::EPSILON
        );
        for bad in [json!({}), json!({"amount": 0}), json!({"amount": -3}), json!({"amount": "x"})] {
            assert!(matches!(
                donation_amount(&object(bad)),
                Err(AppError::BadRequest(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_owner() {
        let body = format!(r#"{{"userEmail":"{OTHER_EMAIL}","targetAmount":100}}"#);
        let (status, _) = send("POST", "/campaigns", Some(OWNER_TOKEN), Some(&body)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_donate_rejects_bad_amount_before_write() {
        for body in [r#"{"amount":0}"#, r#"{"amount":-10}"#, r#"{"amount":"ten"}"#, "{}"] {
            let (status, json) = send(
                "PATCH",
                "/campaigns/donate/65a1f0c2e4b0a1b2c3d4e5f6",
                Some(OWNER_TOKEN),
                Some(body),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["message"], "Invalid donation amount", "{body}");
        }
    }

    #[tokio::test]
    async fn test_pause_requires_boolean() {
        let (status, json) = send(
            "PATCH",
            "/campaigns/pause/65a1f0c2e4b0a1b2c3d4e5f6",
            Some(OWNER_TOKEN),
            Some(r#"{"paused":"yes"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "paused must be a boolean");
    }
}
