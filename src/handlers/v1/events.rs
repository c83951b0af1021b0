//! Event listing and RSVP HTTP handlers.

use std::collections::HashMap;

use axum::extract::{Path as PathExtract, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::Deserialize;

use crate::api::{
    self, CreateEventRequest, EventView, ListEventsResponse, UpdateEventRequest, UserSummary,
};
use crate::auth::CurrentUser;
use crate::handlers::problem_details;
use crate::server::AppState;
use crate::store::{
    Event, EventStore, UserStore, MAX_EVENT_ATTENDEES, MAX_EVENT_DESCRIPTION_LEN,
    MAX_EVENT_TITLE_LEN, MIN_EVENT_ATTENDEES,
};

use super::storage_error;

// ============================================================================
// Query Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    #[serde(default)]
    search: Option<String>,
    /// Comma-separated tag filter; an event matches if it carries any of them.
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    limit: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/events
///
/// Upcoming active events, filtered and paginated, soonest first.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Response {
    let all = match state.events.list().await {
        Ok(events) => events,
        Err(e) => return storage_error(e),
    };

    let now = Utc::now();
    let search = query.search.as_deref().map(str::to_lowercase);
    let tags: Vec<String> = query
        .tags
        .as_deref()
        .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();

    let mut matched: Vec<Event> = all
        .into_iter()
        .filter(|e| e.is_active && e.date >= now)
        .filter(|e| match &search {
            Some(s) => {
                e.title.to_lowercase().contains(s)
                    || e.description.to_lowercase().contains(s)
                    || e.location.to_lowercase().contains(s)
            }
            None => true,
        })
        .filter(|e| tags.is_empty() || e.tags.iter().any(|t| tags.contains(t)))
        .collect();

    matched.sort_by(|a, b| a.date.cmp(&b.date));

    let (page, limit) = api::PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .resolve(20);
    let (page_items, pagination) = api::paginate(matched, page, limit);

    let mut views = Vec::with_capacity(page_items.len());
    for event in &page_items {
        match event_view(state.users.as_ref(), event).await {
            Ok(view) => views.push(view),
            Err(e) => return storage_error(e),
        }
    }

    let response = ListEventsResponse {
        events: views,
        pagination,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    PathExtract(id): PathExtract<String>,
) -> Response {
    let event = match state.events.get(&id).await {
        Ok(Some(event)) => event,
        Ok(None) => return problem_details::not_found("event not found").into_response(),
        Err(e) => return storage_error(e),
    };

    match event_view(state.users.as_ref(), &event).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Json(req): Json<CreateEventRequest>,
) -> Response {
    if let Err(detail) = validate_event_fields(
        &req.title,
        &req.description,
        &req.time,
        &req.location,
        req.max_attendees,
    ) {
        return problem_details::bad_request(detail).into_response();
    }
    if req.date <= Utc::now() {
        return problem_details::bad_request("event date must be in the future").into_response();
    }

    let now = Utc::now();
    let event = Event {
        id: Event::new_id(),
        title: req.title.trim().to_string(),
        description: req.description.trim().to_string(),
        date: req.date,
        time: req.time,
        location: req.location.trim().to_string(),
        organizer: me.id.clone(),
        attendees: Vec::new(),
        max_attendees: req.max_attendees,
        tags: req.tags.iter().map(|t| t.trim().to_string()).collect(),
        image: req.image,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = state.events.create(event.clone()).await {
        return storage_error(e);
    }

    match event_view(state.users.as_ref(), &event).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// PUT /api/v1/events/{id}
///
/// Organizer-only.
pub async fn update_event(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    PathExtract(id): PathExtract<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Response {
    let mut event = match state.events.get(&id).await {
        Ok(Some(event)) => event,
        Ok(None) => return problem_details::not_found("event not found").into_response(),
        Err(e) => return storage_error(e),
    };
    if event.organizer != me.id {
        return problem_details::forbidden("only the organizer can update this event")
            .into_response();
    }

    if let Some(title) = req.title {
        event.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        event.description = description.trim().to_string();
    }
    if let Some(date) = req.date {
        if date <= Utc::now() {
            return problem_details::bad_request("event date must be in the future")
                .into_response();
        }
        event.date = date;
    }
    if let Some(time) = req.time {
        event.time = time;
    }
    if let Some(location) = req.location {
        event.location = location.trim().to_string();
    }
    if let Some(max_attendees) = req.max_attendees {
        if (max_attendees as usize) < event.attendees.len() {
            return problem_details::bad_request(
                "max attendees cannot be lower than the current attendee count",
            )
            .into_response();
        }
        event.max_attendees = max_attendees;
    }
    if let Some(tags) = req.tags {
        event.tags = tags.iter().map(|t| t.trim().to_string()).collect();
    }
    if let Some(image) = req.image {
        event.image = Some(image);
    }

    if let Err(detail) = validate_event_fields(
        &event.title,
        &event.description,
        &event.time,
        &event.location,
        event.max_attendees,
    ) {
        return problem_details::bad_request(detail).into_response();
    }
    event.updated_at = Utc::now();

    if let Err(e) = state.events.update(event.clone()).await {
        return storage_error(e);
    }

    match event_view(state.users.as_ref(), &event).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// DELETE /api/v1/events/{id}
///
/// Organizer-only soft delete.
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    PathExtract(id): PathExtract<String>,
) -> Response {
    let mut event = match state.events.get(&id).await {
        Ok(Some(event)) => event,
        Ok(None) => return problem_details::not_found("event not found").into_response(),
        Err(e) => return storage_error(e),
    };
    if event.organizer != me.id {
        return problem_details::forbidden("only the organizer can delete this event")
            .into_response();
    }

    event.is_active = false;
    event.updated_at = Utc::now();
    if let Err(e) = state.events.update(event).await {
        return storage_error(e);
    }

    StatusCode::NO_CONTENT.into_response()
}

/// POST /api/v1/events/{id}/rsvp
pub async fn join_event(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    PathExtract(id): PathExtract<String>,
) -> Response {
    let mut event = match state.events.get(&id).await {
        Ok(Some(event)) if event.is_active => event,
        Ok(_) => return problem_details::not_found("event not found").into_response(),
        Err(e) => return storage_error(e),
    };

    if event.organizer == me.id {
        return problem_details::bad_request("the organizer is already part of the event")
            .into_response();
    }
    if event.attendees.iter().any(|a| a == &me.id) {
        return problem_details::bad_request("already attending this event").into_response();
    }
    if event.is_full() {
        return problem_details::bad_request("event is full").into_response();
    }

    event.attendees.push(me.id.clone());
    event.updated_at = Utc::now();
    if let Err(e) = state.events.update(event.clone()).await {
        return storage_error(e);
    }

    match event_view(state.users.as_ref(), &event).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => storage_error(e),
    }
}

/// DELETE /api/v1/events/{id}/rsvp
pub async fn leave_event(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    PathExtract(id): PathExtract<String>,
) -> Response {
    let mut event = match state.events.get(&id).await {
        Ok(Some(event)) if event.is_active => event,
        Ok(_) => return problem_details::not_found("event not found").into_response(),
        Err(e) => return storage_error(e),
    };

    let before = event.attendees.len();
    event.attendees.retain(|a| a != &me.id);
    if event.attendees.len() == before {
        return problem_details::bad_request("not attending this event").into_response();
    }

    event.updated_at = Utc::now();
    if let Err(e) = state.events.update(event.clone()).await {
        return storage_error(e);
    }

    match event_view(state.users.as_ref(), &event).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => storage_error(e),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Enrich an event with organizer and attendee display info. Users that no
/// longer resolve are represented by an ID-only placeholder rather than
/// failing the whole view.
async fn event_view(
    users: &dyn UserStore,
    event: &Event,
) -> crate::store::StorageResult<EventView> {
    let mut ids: Vec<&String> = event.attendees.iter().collect();
    ids.push(&event.organizer);

    let mut summaries: HashMap<String, UserSummary> = HashMap::new();
    for id in ids {
        if summaries.contains_key(id) {
            continue;
        }
        let summary = match users.get(id).await? {
            Some(user) => UserSummary::from(&user),
            None => UserSummary {
                id: id.clone(),
                name: "Former member".to_string(),
                profile_image: None,
            },
        };
        summaries.insert(id.clone(), summary);
    }

    Ok(EventView {
        id: event.id.clone(),
        title: event.title.clone(),
        description: event.description.clone(),
        date: event.date,
        time: event.time.clone(),
        location: event.location.clone(),
        organizer: summaries[&event.organizer].clone(),
        attendees: event
            .attendees
            .iter()
            .map(|a| summaries[a].clone())
            .collect(),
        max_attendees: event.max_attendees,
        tags: event.tags.clone(),
        image: event.image.clone(),
        is_active: event.is_active,
        created_at: event.created_at,
    })
}

fn validate_event_fields(
    title: &str,
    description: &str,
    time: &str,
    location: &str,
    max_attendees: u32,
) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_EVENT_TITLE_LEN {
        return Err(format!("title must be 1-{MAX_EVENT_TITLE_LEN} characters"));
    }

    let description = description.trim();
    if description.is_empty() || description.chars().count() > MAX_EVENT_DESCRIPTION_LEN {
        return Err(format!(
            "description must be 1-{MAX_EVENT_DESCRIPTION_LEN} characters"
        ));
    }

    if !valid_time(time) {
        return Err("time must be HH:MM".to_string());
    }

    if location.trim().is_empty() {
        return Err("location must not be empty".to_string());
    }

    if !(MIN_EVENT_ATTENDEES..=MAX_EVENT_ATTENDEES).contains(&max_attendees) {
        return Err(format!(
            "max attendees must be {MIN_EVENT_ATTENDEES}-{MAX_EVENT_ATTENDEES}"
        ));
    }

    Ok(())
}

/// Accept "H:MM" or "HH:MM" on a 24-hour clock.
fn valid_time(value: &str) -> bool {
    match value.split_once(':') {
        Some((h, m)) if !h.is_empty() && h.len() <= 2 && m.len() == 2 => {
            matches!((h.parse::<u8>(), m.parse::<u8>()), (Ok(h), Ok(m)) if h < 24 && m < 60)
        }
        _ => false,
    }
}
