//! Pet listings.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use pet_buddy_core::{PageRequest, PageRequestDefaults};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{info, instrument};

use super::{check_claimed_email, path_email, pet_oid, take_string};
use crate::db::{AvailablePets, PetRepository};
use crate::error::{AppError, AppJson, Result};
use crate::middleware::{CurrentUser, ensure_owner, ensure_owner_or_admin};
use crate::models::{
    DeleteOutcome, InsertOutcome, PetDoc, PetView, UpdateOutcome, json_to_document,
    pet::PROTECTED_FIELDS,
};
use crate::state::AppState;

/// Query for `GET /pets/available`.
#[derive(Debug, Default, Deserialize)]
pub struct AvailableQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
}

/// `petName` must be a string when given; the listing searches on it.
fn check_pet_name(body: &Map<String, Value>) -> Result<()> {
    match body.get("petName") {
        None | Some(Value::String(_)) => Ok(()),
        Some(_) => Err(AppError::BadRequest("petName must be a string".to_owned())),
    }
}

async fn load(state: &AppState, raw_id: &str) -> Result<(bson::oid::ObjectId, PetDoc)> {
    let id = pet_oid(raw_id)?;
    let pet = PetRepository::new(state.db())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pet not found".to_owned()))?;
    Ok((id, pet))
}

/// `POST /pets`: list a pet owned by the caller.
#[instrument(skip(state, identity, body))]
pub async fn create(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    AppJson(mut body): AppJson<Map<String, Value>>,
) -> Result<Json<InsertOutcome>> {
    check_claimed_email(&mut body, "email", &identity)?;
    check_pet_name(&body)?;
    let pet_name = take_string(&mut body, "petName")?;

    let pet = PetDoc::new(
        identity.email.to_string(),
        pet_name,
        json_to_document(body, PROTECTED_FIELDS)?,
    );
    let outcome = PetRepository::new(state.db()).create(&pet).await?;
    info!(owner = %identity.email, pet_id = %outcome.inserted_id, "Listed pet");
    Ok(Json(outcome))
}

/// `PUT /pets/{id}`: overwrite the supplied fields.
#[instrument(skip(state, identity, body))]
pub async fn update(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(body): AppJson<Map<String, Value>>,
) -> Result<Json<UpdateOutcome>> {
    let (id, pet) = load(&state, &id).await?;
    ensure_owner_or_admin(&state, &identity, &pet.email).await?;
    check_pet_name(&body)?;

    let fields = json_to_document(body, PROTECTED_FIELDS)?;
    if fields.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_owned()));
    }
    let outcome = PetRepository::new(state.db())
        .update_fields(id, fields)
        .await?;
    Ok(Json(outcome))
}

/// `GET /pets/available`: one page of adoptable pets, newest first.
#[instrument(skip(state))]
pub async fn available(
    State(state): State<AppState>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Value>> {
    let page = PageRequest::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        PageRequestDefaults::PETS,
    );
    let search = AvailablePets {
        search: query.search.as_deref(),
        category: query.category.as_deref(),
    };

    let pets = PetRepository::new(state.db())
        .list_available(&search, page)
        .await?;
    let next_page = page.next_page(pets.len());
    let pets: Vec<PetView> = pets.into_iter().map(PetView::from).collect();

    Ok(Json(json!({ "pets": pets, "nextPage": next_page })))
}

/// `PATCH /pets/adopt/{id}`: mark a pet adopted.
#[instrument(skip(state, identity))]
pub async fn adopt(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateOutcome>> {
    let (id, pet) = load(&state, &id).await?;
    ensure_owner_or_admin(&state, &identity, &pet.email).await?;
    let outcome = PetRepository::new(state.db()).mark_adopted(id).await?;
    info!(pet_id = %id, "Marked pet adopted");
    Ok(Json(outcome))
}

/// `GET /pets/{id}`.
#[instrument(skip(state))]
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<PetView>> {
    let (_, pet) = load(&state, &id).await?;
    Ok(Json(pet.into()))
}

/// `GET /pets/user/{email}`: the caller's own pets.
#[instrument(skip(state, identity))]
pub async fn for_owner(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<PetView>>> {
    ensure_owner(&identity, &email)?;
    let email = path_email(&email)?;
    let pets = PetRepository::new(state.db()).list_by_owner(&email).await?;
    Ok(Json(pets.into_iter().map(PetView::from).collect()))
}

/// `DELETE /pets/{id}`.
#[instrument(skip(state, identity))]
pub async fn delete(
    CurrentUser(identity): CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteOutcome>> {
    let (id, pet) = load(&state, &id).await?;
    ensure_owner_or_admin(&state, &identity, &pet.email).await?;
    let outcome = PetRepository::new(state.db()).delete(id).await?;
    info!(pet_id = %id, "Deleted pet");
    Ok(Json(outcome))
}
