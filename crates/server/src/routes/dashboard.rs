//! Dashboard summaries.
//!
//! Each summary is a handful of independent counts and sums issued
//! concurrently. Figures are read at slightly different moments and are
//! not a consistent snapshot.

use axum::{
    Json,
    extract::{Path, State},
};
use pet_buddy_core::AdoptionStatus;
use serde::Serialize;
use tracing::instrument;

use super::path_email;
use crate::db::{
    AdoptionRepository, CampaignRepository, DonationRepository, PetRepository, UserRepository,
};
use crate::error::Result;
use crate::middleware::{CurrentUser, RequireAdmin, ensure_owner};
use crate::models::DonationView;
use crate::state::AppState;

/// Donations listed on the personal dashboard.
const RECENT_DONATIONS: i64 = 5;

/// Personal dashboard figures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub pets: u64,
    pub adopted_pets: u64,
    pub available_pets: u64,
    pub campaigns: u64,
    pub active_campaigns: u64,
    pub donations_made: u64,
    pub total_donated: f64,
    pub received_donations: f64,
    pub pending_requests: u64,
    pub recent_donations: Vec<DonationView>,
}

/// Platform-wide figures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub users: u64,
    pub admins: u64,
    pub pets: u64,
    pub adopted_pets: u64,
    pub campaigns: u64,
    pub paused_campaigns: u64,
    pub donations: u64,
    pub total_donated: f64,
    pub adoption_requests: u64,
    pub pending_requests: u64,
}

/// `GET /dashboard/user/{email}`: the caller's own summary.
#[instrument(skip(state, identity))]
pub async fn user_summary(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserSummary>> {
    ensure_owner(&identity, &email)?;
    let email = path_email(&email)?;

    let db = state.db();
    let pets = PetRepository::new(db);
    let campaigns = CampaignRepository::new(db);
    let donations = DonationRepository::new(db);
    let adoptions = AdoptionRepository::new(db);
    let pending = AdoptionStatus::Pending;

    let (
        pet_count,
        adopted_pets,
        campaign_count,
        active_campaigns,
        (donations_made, total_donated),
        pending_requests,
        recent,
        own_campaign_ids,
    ) = tokio::try_join!(
        pets.count(Some(&email), None),
        pets.count(Some(&email), Some(true)),
        campaigns.count(Some(&email), None),
        campaigns.count(Some(&email), Some(false)),
        donations.totals_by_donor(&email),
        adoptions.count(Some(&email), Some(&pending)),
        donations.recent_by_donor(&email, RECENT_DONATIONS),
        campaigns.ids_by_owner(&email),
    )?;

    let (_, received_donations) = donations.totals_for_campaigns(&own_campaign_ids).await?;

    Ok(Json(UserSummary {
        pets: pet_count,
        adopted_pets,
        available_pets: pet_count.saturating_sub(adopted_pets),
        campaigns: campaign_count,
        active_campaigns,
        donations_made,
        total_donated,
        received_donations,
        pending_requests,
        recent_donations: recent.into_iter().map(DonationView::from).collect(),
    }))
}

/// `GET /dashboard/admin`: platform summary.
#[instrument(skip_all)]
pub async fn admin_summary(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<AdminSummary>> {
    let db = state.db();
    let users = UserRepository::new(db);
    let pets = PetRepository::new(db);
    let campaigns = CampaignRepository::new(db);
    let donations = DonationRepository::new(db);
    let adoptions = AdoptionRepository::new(db);
    let pending = AdoptionStatus::Pending;

    let (
        user_count,
        admins,
        pet_count,
        adopted_pets,
        campaign_count,
        paused_campaigns,
        (donation_count, total_donated),
        adoption_requests,
        pending_requests,
    ) = tokio::try_join!(
        users.count(),
        users.count_admins(),
        pets.count(None, None),
        pets.count(None, Some(true)),
        campaigns.count(None, None),
        campaigns.count(None, Some(true)),
        donations.totals_all(),
        adoptions.count(None, None),
        adoptions.count(None, Some(&pending)),
    )?;

    Ok(Json(AdminSummary {
        users: user_count,
        admins,
        pets: pet_count,
        adopted_pets,
        campaigns: campaign_count,
        paused_campaigns,
        donations: donation_count,
        total_donated,
        adoption_requests,
        pending_requests,
    }))
}
