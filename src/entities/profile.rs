//! Profile entity - One member of the club directory.
//!
//! The `id` is the identity provider's user id, so a profile is looked up directly
//! from an authenticated request.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Identity provider user id
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: Option<String>,
    /// Academic department
    pub department: Option<String>,
    /// Student number
    pub student_id: Option<String>,
    /// Gender as entered by the member
    pub gender: Option<String>,
    /// Phone number
    pub phone_number: Option<String>,
    /// Linked Slack user id
    pub slack_user_id: Option<String>,
    /// When the profile was last modified
    pub updated_at: Option<DateTimeUtc>,
}

/// Profiles have no foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
