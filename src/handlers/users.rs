// User directory and public profile handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    app::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        link::Link,
        user::{CreateUserRequest, UpdateUserRequest, User, UserProfile},
    },
    services::{link::LinkService, user::UserService},
    utils::service_error::ServiceError,
};

/// Register a user
/// POST /v1/users
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    operation_id = "createUser",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email or username already taken")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = UserService::new(state.diesel_pool.clone())
        .create_user(request)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Update the caller's profile
/// PATCH /v1/users/me
#[utoipa::path(
    patch,
    path = "/v1/users/me",
    tag = "Users",
    operation_id = "updateCurrentUser",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or malformed caller identity"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Username already taken")
    ),
    security(("userId" = []))
)]
pub async fn update_current_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = UserService::new(state.diesel_pool.clone())
        .update_user(auth_user.user_id, request)
        .await?;

    Ok(Json(user))
}

/// Public profile by username
/// GET /v1/users/{username}
#[utoipa::path(
    get,
    path = "/v1/users/{username}",
    tag = "Users",
    operation_id = "getUserByUsername",
    params(
        ("username" = String, Path, description = "Username", example = "jane_doe")
    ),
    responses(
        (status = 200, description = "Public profile", body = UserProfile),
        (status = 404, description = "No user with that username")
    )
)]
pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = UserService::new(state.diesel_pool.clone())
        .get_user_by_username(&username)
        .await?
        .ok_or(ServiceError::NotFound)?;

    Ok(Json(user.to_profile()))
}

/// Active links shown on a public profile page
/// GET /v1/users/{username}/links
#[utoipa::path(
    get,
    path = "/v1/users/{username}/links",
    tag = "Users",
    operation_id = "listPublicLinks",
    params(
        ("username" = String, Path, description = "Username", example = "jane_doe")
    ),
    responses(
        (status = 200, description = "Active links in display order; empty for unknown usernames", body = [Link])
    )
)]
pub async fn list_public_links(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let links = LinkService::new(state.diesel_pool.clone())
        .list_public_links(&username)
        .await?;

    Ok(Json(links))
}
