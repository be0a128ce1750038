//! Admin listings and role management.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use pet_buddy_core::{PageRequest, PageRequestDefaults, UserRole};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::{PageQuery, take_string, user_oid};
use crate::db::{
    AdoptionRepository, CampaignRepository, DonationRepository, PetRepository, UserRepository,
};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireAdmin;
use crate::models::{
    AdoptionRequestView, CampaignView, DonationView, Listing, PetView, UpdateOutcome, UserView,
};
use crate::state::AppState;

fn page_of(query: &PageQuery) -> PageRequest {
    PageRequest::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        PageRequestDefaults::ADMIN,
    )
}

fn listing<D, V: From<D>>(page: PageRequest, (items, total): (Vec<D>, u64)) -> Listing<V> {
    let next_page = page.next_page(items.len());
    Listing {
        items: items.into_iter().map(V::from).collect(),
        total,
        next_page,
    }
}

/// `GET /allUsers/admin`.
#[instrument(skip(_admin, state))]
pub async fn users(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Listing<UserView>>> {
    let page = page_of(&query);
    let found = UserRepository::new(state.db()).list(page).await?;
    Ok(Json(listing(page, found)))
}

/// `GET /allPets/admin`.
#[instrument(skip(_admin, state))]
pub async fn pets(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Listing<PetView>>> {
    let page = page_of(&query);
    let found = PetRepository::new(state.db()).list(page).await?;
    Ok(Json(listing(page, found)))
}

/// `GET /allCampaigns/admin`.
#[instrument(skip(_admin, state))]
pub async fn campaigns(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Listing<CampaignView>>> {
    let page = page_of(&query);
    let found = CampaignRepository::new(state.db()).list(page).await?;
    Ok(Json(listing(page, found)))
}

/// `GET /allDonations/admin`.
#[instrument(skip(_admin, state))]
pub async fn donations(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Listing<DonationView>>> {
    let page = page_of(&query);
    let found = DonationRepository::new(state.db()).list(page).await?;
    Ok(Json(listing(page, found)))
}

/// `GET /allAdoptions/admin`.
#[instrument(skip(_admin, state))]
pub async fn adoptions(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Listing<AdoptionRequestView>>> {
    let page = page_of(&query);
    let found = AdoptionRepository::new(state.db()).list(page).await?;
    Ok(Json(listing(page, found)))
}

/// `PATCH /allUsers/admin/{id}/role`: grant or clear the admin role.
#[instrument(skip(admin, state, body), fields(admin_email = %admin.identity.email))]
pub async fn set_role(
    admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Json<UpdateOutcome>> {
    let id = user_oid(&id)?;
    let role: UserRole = take_string(&mut body, "role")?
        .ok_or_else(|| AppError::BadRequest("Role is required".to_owned()))?
        .parse()
        .map_err(|_| AppError::BadRequest("Role must be \"admin\" or \"user\"".to_owned()))?;

    if admin.user.id == Some(id) && !role.is_admin() {
        return Err(AppError::BadRequest(
            "Admins cannot remove their own admin role".to_owned(),
        ));
    }

    let users = UserRepository::new(state.db());
    if users.get_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_owned()));
    }
    let outcome = users.set_role_by_id(id, role).await?;
    info!(user_id = %id, role = %role, "User role changed");
    Ok(Json(outcome))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::UserDoc;
    use bson::oid::ObjectId;

    #[test]
    fn test_listing_next_page() {
        let page = PageRequest::from_query(None, Some("2"), PageRequestDefaults::ADMIN);
        let full: Listing<UserView> = listing(
            page,
            (
                vec![
                    UserDoc {
                        id: Some(ObjectId::new()),
                        email: "a@x.io".into(),
                        ..UserDoc::default()
                    },
                    UserDoc {
                        id: Some(ObjectId::new()),
                        email: "b@x.io".into(),
                        ..UserDoc::default()
                    },
                ],
                7,
            ),
        );
        assert_eq!(full.total, 7);
        assert_eq!(full.next_page, Some(2));

        let short: Listing<UserView> = listing(page, (vec![UserDoc::default()], 7));
        assert_eq!(short.next_page, None);
    }

    #[test]
    fn test_admin_default_limit() {
        let page = page_of(&PageQuery::default());
        assert_eq!(page.limit(), 20);
        let capped = page_of(&PageQuery {
            page: None,
            limit: Some("500".into()),
        });
        assert_eq!(capped.limit(), 50);
    }
}
