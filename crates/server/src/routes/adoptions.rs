//! Adoption requests.
//!
//! Accepting a request marks the pet adopted in a second update. The two
//! writes are not atomic: if the second fails the request stays accepted
//! and the error is reported.

use axum::{
    Json,
    extract::{Path, State},
};
use pet_buddy_core::{AdoptionStatus, PetId};
use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use super::{adoption_oid, check_claimed_email, path_email, pet_oid, take_string};
use crate::db::{AdoptionRepository, PetRepository, RepositoryError};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{CurrentUser, ensure_owner, ensure_owner_or_admin};
use crate::models::{
    AdoptionRequestDoc, AdoptionRequestView, InsertOutcome, Timestamp, UpdateOutcome,
    json_to_document,
};
use crate::state::AppState;

/// Keys the server sets on a request.
const PROTECTED_FIELDS: &[&str] = &["ownerEmail", "requesterEmail", "petId", "status", "createdAt"];

/// `POST /pet/adoptions`: ask to adopt a pet.
#[instrument(skip(state, identity, body))]
pub async fn create(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Json<InsertOutcome>> {
    check_claimed_email(&mut body, "requesterEmail", &identity)?;
    let raw_pet_id = take_string(&mut body, "petId")?
        .ok_or_else(|| AppError::BadRequest("petId is required".to_owned()))?;
    let pet_id = pet_oid(&raw_pet_id)?;

    let pet = PetRepository::new(state.db())
        .get_by_id(pet_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pet not found".to_owned()))?;
    if pet.adoption {
        return Err(AppError::BadRequest("Pet is already adopted".to_owned()));
    }
    if identity.email.matches(&pet.email) {
        return Err(AppError::BadRequest(
            "You cannot request to adopt your own pet".to_owned(),
        ));
    }

    let request = AdoptionRequestDoc {
        id: None,
        owner_email: pet.email,
        requester_email: identity.email.to_string(),
        pet_id: pet_id.to_hex(),
        status: AdoptionStatus::Pending,
        created_at: Some(Timestamp::now()),
        extra: json_to_document(body, PROTECTED_FIELDS)?,
    };
    let outcome = AdoptionRepository::new(state.db()).create(&request).await?;
    info!(pet_id = %pet_id, requester = %identity.email, "Adoption requested");
    Ok(Json(outcome))
}

/// `PATCH /pet/adoptions/{id}`: set the status; `"accepted"` also marks the
/// pet adopted.
#[instrument(skip(state, identity, body))]
pub async fn set_status(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Json<UpdateOutcome>> {
    let id = adoption_oid(&id)?;
    let status = take_string(&mut body, "status")?
        .as_deref()
        .and_then(AdoptionStatus::parse)
        .ok_or_else(|| AppError::BadRequest("Status is required".to_owned()))?;

    let adoptions = AdoptionRepository::new(state.db());
    let request = adoptions
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Adoption request not found".to_owned()))?;
    ensure_owner_or_admin(&state, &identity, &request.owner_email).await?;

    let outcome = adoptions.set_status(id, &status).await?;
    info!(request_id = %id, status = %status, "Adoption status set");

    if status.marks_pet_adopted() {
        let pet_id = PetId::parse(&request.pet_id)
            .map_err(|_| RepositoryError::InvalidId(request.pet_id.clone()))?;
        let marked = PetRepository::new(state.db())
            .mark_adopted(pet_id.into())
            .await?;
        if marked.matched_count == 0 {
            warn!(request_id = %id, pet_id = %pet_id, "Accepted request for a pet that no longer exists");
        }
    }

    Ok(Json(outcome))
}

/// `GET /pet/adoptions/user/{email}`: requests for the caller's pets.
#[instrument(skip(state, identity))]
pub async fn for_owner(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<AdoptionRequestView>>> {
    ensure_owner(&identity, &email)?;
    let email = path_email(&email)?;
    let requests = AdoptionRepository::new(state.db())
        .list_for_owner(&email)
        .await?;
    Ok(Json(
        requests
            .into_iter()
            .map(AdoptionRequestView::from)
            .collect(),
    ))
}

/// `GET /pet/adoptions/requester/{email}`: requests the caller made.
#[instrument(skip(state, identity))]
pub async fn for_requester(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<AdoptionRequestView>>> {
    ensure_owner(&identity, &email)?;
    let email = path_email(&email)?;
    let requests = AdoptionRepository::new(state.db())
        .list_for_requester(&email)
        .await?;
    Ok(Json(
        requests
            .into_iter()
            .map(AdoptionRequestView::from)
            .collect(),
    ))
}
