//! Member directory - profile lookups keyed by the identity provider's user id.

use crate::{
    core::transaction::like_pattern,
    entities::{Profile, profile},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    QueryOrder, Set,
    prelude::*,
    sea_query::{Expr, Func},
};
use tracing::{debug, instrument};

/// Fields supplied when registering a member profile.
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    /// Identity provider user id
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Academic department
    pub department: Option<String>,
    /// Student number
    pub student_id: Option<String>,
    /// Gender
    pub gender: Option<String>,
    /// Phone number
    pub phone_number: Option<String>,
    /// Linked Slack user id
    pub slack_user_id: Option<String>,
}

/// Partial update of a profile. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    /// Display name
    pub name: Option<String>,
    /// Academic department
    pub department: Option<String>,
    /// Student number
    pub student_id: Option<String>,
    /// Gender
    pub gender: Option<String>,
    /// Phone number
    pub phone_number: Option<String>,
    /// Linked Slack user id
    pub slack_user_id: Option<String>,
}

/// Filters for [`list_profiles`]. Empty strings are treated as absent.
#[derive(Debug, Clone, Default)]
pub struct ProfileQuery {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Exact department
    pub department: Option<String>,
}

/// Registers a member profile.
///
/// # Arguments
/// * `db` - Database connection
/// * `new` - Profile fields; `id` must be the member's identity provider id
///
/// # Errors
/// Returns [`Error::Database`] if the insert fails, including when a profile with
/// the same id already exists.
#[instrument(skip(db, new), fields(id = %new.id))]
pub async fn create_profile(db: &DatabaseConnection, new: NewProfile) -> Result<profile::Model> {
    let model = profile::ActiveModel {
        id: Set(new.id),
        name: Set(new.name),
        email: Set(new.email),
        department: Set(new.department),
        student_id: Set(new.student_id),
        gender: Set(new.gender),
        phone_number: Set(new.phone_number),
        slack_user_id: Set(new.slack_user_id),
        updated_at: Set(Some(Utc::now())),
    };

    let created = model.insert(db).await?;
    debug!("Created profile {}", created.id);
    Ok(created)
}

/// Looks up the profile of one user.
///
/// # Arguments
/// * `db` - Database connection
/// * `user_id` - Identity provider user id
///
/// # Errors
/// Returns [`Error::ProfileNotFound`] when no profile has that id, and
/// [`Error::Database`] if the query fails.
pub async fn get_profile(db: &DatabaseConnection, user_id: &str) -> Result<profile::Model> {
    Profile::find_by_id(user_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| Error::ProfileNotFound {
            id: user_id.to_string(),
        })
}

/// Lists member profiles ordered by name.
///
/// The name filter is a case-insensitive substring match (ASCII letters only, as
/// with transaction search); the department filter must match exactly. Both
/// filters apply together.
///
/// # Arguments
/// * `db` - Database connection
/// * `query` - Optional name and department filters
///
/// # Errors
/// Returns [`Error::Database`] if the query fails.
#[instrument(skip(db))]
pub async fn list_profiles(
    db: &DatabaseConnection,
    query: &ProfileQuery,
) -> Result<Vec<profile::Model>> {
    let mut select = Profile::find();

    if let Some(name) = query.name.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(profile::Column::Name))).like(like_pattern(name)),
        );
    }
    if let Some(department) = query.department.as_deref().filter(|s| !s.is_empty()) {
        select = select.filter(profile::Column::Department.eq(department));
    }

    select
        .order_by_asc(profile::Column::Name)
        .order_by_asc(profile::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a profile and refreshes `updated_at`.
///
/// # Errors
/// Returns [`Error::ProfileNotFound`] when no profile has that id.
#[instrument(skip(db, update))]
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: &str,
    update: ProfileUpdate,
) -> Result<profile::Model> {
    let existing = get_profile(db, user_id).await?;

    let mut active: profile::ActiveModel = existing.into();
    if let Some(name) = update.name {
        active.name = Set(name);
    }
    if let Some(department) = update.department {
        active.department = Set(Some(department));
    }
    if let Some(student_id) = update.student_id {
        active.student_id = Set(Some(student_id));
    }
    if let Some(gender) = update.gender {
        active.gender = Set(Some(gender));
    }
    if let Some(phone_number) = update.phone_number {
        active.phone_number = Set(Some(phone_number));
    }
    if let Some(slack_user_id) = update.slack_user_id {
        active.slack_user_id = Set(Some(slack_user_id));
    }
    active.updated_at = Set(Some(Utc::now()));

    active.update(db).await.map_err(Into::into)
}
