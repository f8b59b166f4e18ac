use crate::error::AppError;
use crate::models::{Appointment, Role, User};
use crate::validation::ValidatedAppointment;
use chrono::NaiveDate;
use nanoid::nanoid;
use sqlx::SqlitePool;

const PREDEFINED_USERS: [(&str, &str, &str, Role); 4] = [
    (
        "550e8400-e29b-41d4-a716-446655440000",
        "Administrator Sistem",
        "admin",
        Role::Admin,
    ),
    (
        "550e8400-e29b-41d4-a716-446655440001",
        "Gheorghe Bardan",
        "gheorghe.bardan",
        Role::Trainer,
    ),
    (
        "550e8400-e29b-41d4-a716-446655440002",
        "Dumitru Vlad",
        "dumitru.vlad",
        Role::Trainer,
    ),
    (
        "550e8400-e29b-41d4-a716-446655440003",
        "Mitocaru Constantin",
        "mitocaru.constantin",
        Role::Trainer,
    ),
];

pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL CHECK (role IN ('admin', 'trainer'))
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS appointments (
            id TEXT PRIMARY KEY,
            trainer_name TEXT NOT NULL,
            school_name TEXT NOT NULL,
            date DATE NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            observations TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS appointments_by_day ON appointments (date, trainer_name)",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Inserts the predefined admin and trainers when the users table is empty.
pub async fn seed_users_if_empty(pool: &SqlitePool) -> Result<(), AppError> {
    let user_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if user_count.0 > 0 {
        return Ok(());
    }

    tracing::info!("users table is empty, seeding predefined users");
    let mut tx = pool.begin().await?;
    for (id, full_name, username, role) in PREDEFINED_USERS {
        sqlx::query("INSERT INTO users (id, full_name, username, role) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(full_name)
            .bind(username)
            .bind(role)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, AppError> {
    sqlx::query_as("SELECT id, full_name, username, role FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn find_user_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    sqlx::query_as("SELECT id, full_name, username, role FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn get_trainers(pool: &SqlitePool) -> Result<Vec<User>, AppError> {
    sqlx::query_as(
        "SELECT id, full_name, username, role FROM users WHERE role = ? ORDER BY full_name",
    )
    .bind(Role::Trainer)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)
}

/// Appointments between `from` and `to` inclusive, either bound optional.
pub async fn get_appointments(
    pool: &SqlitePool,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    trainer_name: Option<&str>,
) -> Result<Vec<Appointment>, AppError> {
    sqlx::query_as(
        "SELECT * FROM appointments
         WHERE (?1 IS NULL OR date >= ?1)
           AND (?2 IS NULL OR date <= ?2)
           AND (?3 IS NULL OR trainer_name = ?3)
         ORDER BY date, start_time",
    )
    .bind(from)
    .bind(to)
    .bind(trainer_name)
    .fetch_all(pool)
    .await
    .map_err(AppError::from)
}

/// Snapshot of one day's appointments, the set a candidate is checked against.
pub async fn get_appointments_on(
    pool: &SqlitePool,
    date: NaiveDate,
) -> Result<Vec<Appointment>, AppError> {
    get_appointments(pool, Some(date), Some(date), None).await
}

pub async fn find_appointment(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Appointment>, AppError> {
    sqlx::query_as("SELECT * FROM appointments WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn create_appointment(
    pool: &SqlitePool,
    apt: &ValidatedAppointment,
) -> Result<Appointment, AppError> {
    let id = nanoid!(10);
    let appointment = sqlx::query_as(
        "INSERT INTO appointments
             (id, trainer_name, school_name, date, start_time, end_time, observations)
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(id)
    .bind(&apt.trainer_name)
    .bind(&apt.school_name)
    .bind(apt.date)
    .bind(apt.start_time)
    .bind(apt.end_time)
    .bind(&apt.observations)
    .fetch_one(pool)
    .await?;
    Ok(appointment)
}

pub async fn update_appointment(
    pool: &SqlitePool,
    id: &str,
    apt: &ValidatedAppointment,
) -> Result<Option<Appointment>, AppError> {
    sqlx::query_as(
        "UPDATE appointments
         SET trainer_name = ?, school_name = ?, date = ?, start_time = ?, end_time = ?,
             observations = ?, updated_at = CURRENT_TIMESTAMP
         WHERE id = ? RETURNING *",
    )
    .bind(&apt.trainer_name)
    .bind(&apt.school_name)
    .bind(apt.date)
    .bind(apt.start_time)
    .bind(apt.end_time)
    .bind(&apt.observations)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from)
}

/// Returns whether a row was deleted.
pub async fn delete_appointment(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
