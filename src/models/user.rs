// User database model and profile DTOs

use chrono::{DateTime, Utc};
use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::impl_text_sql;
use super::subscription::SubscriptionStatus;
use crate::schema::users;
use crate::utils::validation::{
    deserialize_some, trim_nullable_field, trim_optional_field, validate_nullable_length,
    validate_nullable_url,
};

/// Public page theme
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    AsExpression,
    FromSqlRow,
)]
#[diesel(sql_type = diesel::sql_types::Text)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Invalid theme: {}", s)),
        }
    }
}

impl_text_sql!(Theme);

/// User database model - queryable from database
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, ToSchema)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub theme: Theme,
    pub is_premium: bool,
    pub subscription_id: Option<Uuid>,
    pub subscription_status: Option<SubscriptionStatus>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user for insertion
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub theme: Theme,
}

/// User update struct. Outer `None` leaves a column untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub display_name: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub theme: Option<Theme>,
    pub is_premium: Option<bool>,
    pub subscription_id: Option<Option<Uuid>>,
    pub subscription_status: Option<Option<SubscriptionStatus>>,
    pub updated_at: DateTime<Utc>,
}

impl UserUpdate {
    /// An update that only refreshes `updated_at`
    pub fn touch() -> Self {
        Self {
            username: None,
            display_name: None,
            avatar_url: None,
            bio: None,
            theme: None,
            is_premium: None,
            subscription_id: None,
            subscription_status: None,
            updated_at: Utc::now(),
        }
    }
}

/// Errors for user operations
#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("User not found")]
    NotFound,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Username already taken")]
    UsernameTaken,
}

impl UserError {
    fn from_write(error: DieselError) -> Self {
        match &error {
            DieselError::NotFound => UserError::NotFound,
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                match info.constraint_name() {
                    Some("users_email_key") => UserError::EmailTaken,
                    Some("users_username_key") => UserError::UsernameTaken,
                    _ => UserError::Database(error),
                }
            },
            _ => UserError::Database(error),
        }
    }
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        users
            .filter(id.eq(user_id))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .map_err(|e| match e {
                DieselError::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    /// Find user by ID and hold a row lock until the surrounding transaction ends.
    ///
    /// Every mutation of a user's link list takes this lock first, so sibling
    /// snapshots read afterwards cannot go stale.
    pub async fn find_for_update(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        users
            .find(user_id)
            .select(User::as_select())
            .for_update()
            .get_result::<User>(conn)
            .await
            .map_err(|e| match e {
                DieselError::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    /// Find user by username (exact match)
    pub async fn find_by_username(
        conn: &mut AsyncPgConnection,
        name: &str,
    ) -> Result<Option<Self>, UserError> {
        use crate::schema::users::dsl::*;

        users
            .filter(username.eq(name))
            .select(User::as_select())
            .first::<User>(conn)
            .await
            .optional()
            .map_err(UserError::Database)
    }

    /// Create a new user
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_user: NewUser,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        diesel::insert_into(users)
            .values(&new_user)
            .returning(User::as_returning())
            .get_result::<User>(conn)
            .await
            .map_err(UserError::from_write)
    }

    /// Update user
    pub async fn update(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
        update: UserUpdate,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        diesel::update(users.filter(id.eq(user_id)))
            .set(&update)
            .returning(User::as_returning())
            .get_result::<User>(conn)
            .await
            .map_err(UserError::from_write)
    }

    pub fn to_profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            avatar_url: self.avatar_url.clone(),
            bio: self.bio.clone(),
            theme: self.theme,
            is_premium: self.is_premium,
        }
    }
}

/// Public profile returned for username lookups
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub theme: Theme,
    pub is_premium: bool,
}

lazy_static! {
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Request to register a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "email": "ada@example.com",
    "username": "ada",
    "display_name": "Ada Lovelace",
    "avatar_url": "https://example.com/ada.png",
    "bio": "Analytical engines and poetry",
    "theme": "dark"
}))]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    #[validate(regex(
        path = "USERNAME_REGEX",
        message = "Username can only contain letters, numbers, hyphens, and underscores"
    ))]
    pub username: String,

    #[validate(length(max = 255, message = "Display name must be at most 255 characters"))]
    pub display_name: Option<String>,

    #[validate(url(message = "Invalid avatar URL format"))]
    pub avatar_url: Option<String>,

    #[validate(length(max = 200, message = "Bio must be at most 200 characters"))]
    pub bio: Option<String>,

    pub theme: Option<Theme>,
}

impl CreateUserRequest {
    /// Trim and sanitize input fields
    pub fn sanitize(&mut self) {
        self.email = self.email.trim().to_lowercase();
        self.username = self.username.trim().to_string();
        self.display_name = trim_optional_field(self.display_name.as_ref());
        self.avatar_url = trim_optional_field(self.avatar_url.as_ref());
        self.bio = trim_optional_field(self.bio.as_ref());
    }

    pub fn into_new_user(self) -> NewUser {
        NewUser {
            email: self.email,
            username: self.username,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            bio: self.bio,
            theme: self.theme.unwrap_or_default(),
        }
    }
}

/// Partial profile update. An explicit `null` clears a nullable field.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    #[validate(regex(
        path = "USERNAME_REGEX",
        message = "Username can only contain letters, numbers, hyphens, and underscores"
    ))]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub display_name: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub avatar_url: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,

    pub theme: Option<Theme>,
}

impl UpdateUserRequest {
    pub fn sanitize(&mut self) {
        self.username = self.username.as_ref().map(|s| s.trim().to_string());
        self.display_name = trim_nullable_field(self.display_name.as_ref());
        self.avatar_url = trim_nullable_field(self.avatar_url.as_ref());
        self.bio = trim_nullable_field(self.bio.as_ref());
    }

    /// Checks for the tri-state fields the derive does not cover
    pub fn validate_custom(&self) -> Result<(), String> {
        validate_nullable_length("Display name", &self.display_name, 255)?;
        validate_nullable_url("Avatar URL", &self.avatar_url)?;
        validate_nullable_length("Bio", &self.bio, 200)?;
        Ok(())
    }

    pub fn into_update(self) -> UserUpdate {
        UserUpdate {
            username: self.username,
            display_name: self.display_name,
            avatar_url: self.avatar_url,
            bio: self.bio,
            theme: self.theme,
            ..UserUpdate::touch()
        }
    }
}
