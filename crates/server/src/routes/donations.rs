//! Donations.
//!
//! A donation is inserted first and then added to the campaign total. The
//! two writes are not atomic: when the campaign does not exist the donation
//! stays stored and the caller gets a 404.

use axum::{
    Json,
    extract::{Path, State},
};
use pet_buddy_core::CampaignId;
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::{campaigns::donation_amount, check_claimed_email, path_email, take_string};
use crate::db::{CampaignRepository, DonationRepository};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{CurrentUser, ensure_owner};
use crate::models::{DonationDoc, DonationView, InsertOutcome, Timestamp, json_to_document};
use crate::state::AppState;

/// Keys the server sets on a donation.
const PROTECTED_FIELDS: &[&str] = &["donorEmail", "campaignId", "amount", "createdAt"];

fn campaign_id(raw: Option<&str>) -> Result<CampaignId> {
    raw.and_then(|id| CampaignId::parse(id).ok())
        .ok_or_else(|| AppError::BadRequest("Invalid campaign id".to_owned()))
}

/// `POST /donations`: record a donation and add it to the campaign total.
#[instrument(skip(state, identity, body))]
pub async fn create(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Json<InsertOutcome>> {
    let amount = donation_amount(&body)?;
    let campaign = campaign_id(take_string(&mut body, "campaignId")?.as_deref())?;
    check_claimed_email(&mut body, "donorEmail", &identity)?;

    let donation = DonationDoc {
        id: None,
        donor_email: identity.email.to_string(),
        campaign_id: campaign.to_string(),
        amount,
        created_at: Some(Timestamp::now()),
        extra: json_to_document(body, PROTECTED_FIELDS)?,
    };
    let outcome = DonationRepository::new(state.db()).create(&donation).await?;

    let credited = CampaignRepository::new(state.db())
        .add_donation(campaign.into(), amount)
        .await?;
    if credited.matched_count == 0 {
        warn!(donation_id = %outcome.inserted_id, campaign_id = %campaign, "Donation recorded for unknown campaign");
        return Err(AppError::NotFound("Campaign not found".to_owned()));
    }

    info!(donor = %identity.email, campaign_id = %campaign, amount, "Donation recorded");
    Ok(Json(outcome))
}

/// `GET /donations/campaign/{id}`: donations to one campaign.
#[instrument(skip(state))]
pub async fn for_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DonationView>>> {
    let campaign = campaign_id(Some(&id))?;
    let donations = DonationRepository::new(state.db())
        .list_for_campaign(campaign)
        .await?;
    Ok(Json(donations.into_iter().map(DonationView::from).collect()))
}

/// `GET /donations/user/{email}`: the caller's own donations.
#[instrument(skip(state, identity))]
pub async fn for_donor(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<DonationView>>> {
    ensure_owner(&identity, &email)?;
    let email = path_email(&email)?;
    let donations = DonationRepository::new(state.db())
        .list_by_donor(&email)
        .await?;
    Ok(Json(donations.into_iter().map(DonationView::from).collect()))
}
