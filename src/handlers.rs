use crate::{
    auth::{CurrentUser, RequireAdmin},
    db,
    error::AppError,
    models::{Appointment, AppointmentForm, User},
    state::AppState,
    validation::ValidationOutcome,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginPayload {
    username: String,
}

pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<User>, AppError> {
    let user = db::find_user_by_username(&app_state.pool, payload.username.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    tracing::info!(user = %user.username, role = ?user.role, "user logged in");
    Ok(Json(user))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub async fn get_trainers(State(app_state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    db::get_trainers(&app_state.pool).await.map(Json)
}

/// `date` selects a single day and takes precedence over the `from`/`to` range.
#[derive(Deserialize)]
pub struct AppointmentFilter {
    date: Option<NaiveDate>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    trainer_name: Option<String>,
}

pub async fn get_appointments(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let (from, to) = match filter.date {
        Some(day) => (Some(day), Some(day)),
        None => (filter.from, filter.to),
    };
    db::get_appointments(&app_state.pool, from, to, filter.trainer_name.as_deref())
        .await
        .map(Json)
}

pub async fn get_appointment(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, AppError> {
    db::find_appointment(&app_state.pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))
}

pub async fn create_appointment(
    State(app_state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(form): Json<AppointmentForm>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let existing = db::get_appointments_on(&app_state.pool, form.date).await?;
    let accepted = app_state
        .validator
        .validate_appointment_form(&form, &existing, None)
        .inspect_err(|e| tracing::debug!(error = %e, "rejected new appointment"))?;

    let created = db::create_appointment(&app_state.pool, &accepted).await?;
    tracing::info!(
        id = %created.id,
        trainer = %created.trainer_name,
        date = %created.date,
        by = %admin.username,
        "appointment created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_appointment(
    State(app_state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Json(form): Json<AppointmentForm>,
) -> Result<Json<Appointment>, AppError> {
    if db::find_appointment(&app_state.pool, &id).await?.is_none() {
        return Err(AppError::NotFound("appointment not found".to_string()));
    }

    let existing = db::get_appointments_on(&app_state.pool, form.date).await?;
    let accepted = app_state
        .validator
        .validate_appointment_form(&form, &existing, Some(&id))
        .inspect_err(|e| tracing::debug!(id = %id, error = %e, "rejected appointment edit"))?;

    let updated = db::update_appointment(&app_state.pool, &id, &accepted)
        .await?
        .ok_or_else(|| AppError::NotFound("appointment not found".to_string()))?;
    tracing::info!(id = %updated.id, by = %admin.username, "appointment updated");
    Ok(Json(updated))
}

pub async fn delete_appointment(
    State(app_state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !db::delete_appointment(&app_state.pool, &id).await? {
        return Err(AppError::NotFound("appointment not found".to_string()));
    }
    tracing::info!(id = %id, by = %admin.username, "appointment deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct ValidatePayload {
    #[serde(flatten)]
    form: AppointmentForm,
    exclude_id: Option<String>,
}

/// Dry run of the create/edit checks, for the form to call before submitting.
pub async fn validate_appointment(
    State(app_state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<ValidatePayload>,
) -> Result<Json<ValidationOutcome>, AppError> {
    let existing = db::get_appointments_on(&app_state.pool, payload.form.date).await?;
    let result = app_state.validator.validate_appointment_form(
        &payload.form,
        &existing,
        payload.exclude_id.as_deref(),
    );
    Ok(Json(ValidationOutcome::from(&result)))
}
