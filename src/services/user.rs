// User Directory: registration, profile updates and username lookup

use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DieselPool,
    models::user::{CreateUserRequest, UpdateUserRequest, User},
    utils::{
        audit_logger::{AuditAction, AuditLogger},
        service_error::ServiceError,
    },
};

#[derive(Clone)]
pub struct UserService {
    diesel_pool: DieselPool,
}

impl UserService {
    pub fn new(diesel_pool: DieselPool) -> Self {
        Self { diesel_pool }
    }

    /// Register a user. Duplicate email or username is a `Conflict`.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn create_user(&self, mut request: CreateUserRequest) -> Result<User, ServiceError> {
        request.sanitize();
        request.validate()?;

        let mut conn = self.diesel_pool.get().await?;
        let user = User::create(&mut conn, request.into_new_user()).await?;

        info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Partial profile update with the same omitted-vs-null rules as links
    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        mut request: UpdateUserRequest,
    ) -> Result<User, ServiceError> {
        request.sanitize();
        request.validate()?;
        request
            .validate_custom()
            .map_err(ServiceError::ValidationError)?;

        let mut conn = self.diesel_pool.get().await?;
        let user = User::update(&mut conn, user_id, request.into_update()).await?;

        AuditLogger::log(AuditAction::ProfileUpdated, user_id, None, None);
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let mut conn = self.diesel_pool.get().await?;
        Ok(User::find_by_username(&mut conn, username.trim()).await?)
    }
}
