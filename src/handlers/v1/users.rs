//! User directory HTTP handlers.

use axum::extract::{Path as PathExtract, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::api::{self, ListUsersResponse, UpdateProfileRequest, UserView};
use crate::auth::CurrentUser;
use crate::handlers::problem_details;
use crate::server::AppState;
use crate::store::{
    FundingStage, Industry, User, UserStore, MAX_BIO_LEN, MAX_NAME_LEN, MAX_STARTUP_NAME_LEN,
    MIN_BIO_LEN,
};

use super::storage_error;

// ============================================================================
// Query Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    funding_stage: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/users
///
/// Active users excluding the caller, filtered and paginated.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Query(query): Query<ListUsersQuery>,
) -> Response {
    let all = match state.users.list().await {
        Ok(users) => users,
        Err(e) => return storage_error(e),
    };

    let search = query.search.as_deref().map(str::to_lowercase);
    let location = query.location.as_deref().map(str::to_lowercase);

    let mut matched: Vec<User> = all
        .into_iter()
        .filter(|u| u.is_active && u.id != me.id)
        .filter(|u| match &search {
            Some(s) => {
                u.name.to_lowercase().contains(s)
                    || u.startup_name.to_lowercase().contains(s)
                    || u.bio.to_lowercase().contains(s)
            }
            None => true,
        })
        .filter(|u| match &query.industry {
            Some(i) => u.industry.as_str() == i,
            None => true,
        })
        .filter(|u| match &query.funding_stage {
            Some(f) => u.funding_stage.as_str() == f,
            None => true,
        })
        .filter(|u| match &location {
            Some(l) => u.location.to_lowercase().contains(l),
            None => true,
        })
        .collect();

    matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let (page, limit) = api::PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(20);
    let (page_items, pagination) = api::paginate(matched, page, limit);

    let response = ListUsersResponse {
        users: page_items.iter().map(UserView::from).collect(),
        pagination,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    PathExtract(id): PathExtract<String>,
) -> Response {
    let user = match state.users.get(&id).await {
        Ok(Some(user)) => user,
        Ok(None) => return problem_details::not_found("user not found").into_response(),
        Err(e) => return storage_error(e),
    };

    (StatusCode::OK, Json(UserView::from(&user))).into_response()
}

/// PUT /api/v1/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Response {
    let (industry, funding_stage) = match validate_profile(&req) {
        Ok(parsed) => parsed,
        Err(detail) => return problem_details::bad_request(detail).into_response(),
    };

    let mut user = me;
    user.name = req.name.trim().to_string();
    user.startup_name = req.startup_name.trim().to_string();
    user.industry = industry;
    user.funding_stage = funding_stage;
    user.location = req.location.trim().to_string();
    user.bio = req.bio.trim().to_string();
    if let Some(image) = req.profile_image {
        user.profile_image = Some(image);
    }
    user.updated_at = Utc::now();

    if let Err(e) = state.users.update(user.clone()).await {
        return storage_error(e);
    }

    (StatusCode::OK, Json(UserView::from(&user))).into_response()
}

// ============================================================================
// Validation
// ============================================================================

fn validate_profile(req: &UpdateProfileRequest) -> Result<(Industry, FundingStage), String> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(format!("name must be 1-{MAX_NAME_LEN} characters"));
    }

    let startup = req.startup_name.trim();
    if startup.is_empty() || startup.chars().count() > MAX_STARTUP_NAME_LEN {
        return Err(format!(
            "startup name must be 1-{MAX_STARTUP_NAME_LEN} characters"
        ));
    }

    let industry = Industry::parse(&req.industry)
        .ok_or_else(|| format!("unknown industry '{}'", req.industry))?;
    let funding_stage = FundingStage::parse(&req.funding_stage)
        .ok_or_else(|| format!("unknown funding stage '{}'", req.funding_stage))?;

    if req.location.trim().is_empty() {
        return Err("location must not be empty".to_string());
    }

    let bio_len = req.bio.trim().chars().count();
    if bio_len < MIN_BIO_LEN || bio_len > MAX_BIO_LEN {
        return Err(format!("bio must be {MIN_BIO_LEN}-{MAX_BIO_LEN} characters"));
    }

    Ok((industry, funding_stage))
}
