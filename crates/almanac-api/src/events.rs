use axum::{
    Extension, Form, Json,
    extract::{Multipart, State},
    response::Html,
};
use tracing::{debug, info, warn};

use almanac_types::api::{
    DeleteEventForm, EventResponse, InsertEventForm, SUCCESS, UpdateEventForm,
};
use almanac_types::time::parse_form_timestamp;
use almanac_types::{Account, Event, NewEvent, is_owner};

use crate::error::{ApiError, ApiResult};
use crate::import::{is_csv_filename, parse_csv};
use crate::pages;
use crate::state::{AppState, blocking};

const UPLOAD_FIELD: &str = "csv_file";
const UPLOAD_OK: &str = "You have successfully registered your annual schedule";
const UPLOAD_UNSUPPORTED: &str =
    "The file does not exist or isn't supported in a supported format!";
const DELETED_ALL: &str = "All schedules have been deleted";

/// GET /: the calendar page.
pub async fn index(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> ApiResult<Html<String>> {
    let events = own_events(&state, &account).await?;
    Ok(pages::calendar(&account, &events)?)
}

/// GET /events: JSON feed for the calendar widget.
pub async fn feed(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> ApiResult<Json<Vec<EventResponse>>> {
    let events = own_events(&state, &account).await?;
    Ok(Json(events.iter().map(EventResponse::from).collect()))
}

/// The store scopes the listing by owner in SQL.
async fn own_events(state: &AppState, account: &Account) -> ApiResult<Vec<Event>> {
    let owner = account.id;
    let events = blocking(state, move |s| Ok(s.db.list_events(&owner)?)).await?;
    debug_assert!(events.iter().all(|e| is_owner(account, e)));
    Ok(events)
}

/// POST /insert
pub async fn insert(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Form(form): Form<InsertEventForm>,
) -> ApiResult<Json<&'static str>> {
    let event = new_event(form.title, &form.start, &form.end)?;
    let owner = account.id;

    let id = blocking(&state, move |s| Ok(s.db.insert_event(&owner, &event)?)).await?;
    debug!("Account {} created event {}", owner, id);

    Ok(Json(SUCCESS))
}

/// POST /update: a miss (unknown id or someone else's event) still
/// answers success so callers learn nothing about other accounts.
pub async fn update(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Form(form): Form<UpdateEventForm>,
) -> ApiResult<Json<&'static str>> {
    let event = new_event(form.title, &form.start, &form.end)?;
    let owner = account.id;
    let id = form.id;

    let changed = blocking(&state, move |s| Ok(s.db.update_event(&owner, id, &event)?)).await?;
    if changed == 0 {
        debug!("Update of event {} by {} matched nothing", id, owner);
    }

    Ok(Json(SUCCESS))
}

/// POST /ajax_delete: same miss semantics as update.
pub async fn delete(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    Form(form): Form<DeleteEventForm>,
) -> ApiResult<Json<&'static str>> {
    let owner = account.id;
    let id = form.id;

    let changed = blocking(&state, move |s| Ok(s.db.delete_event(&owner, id)?)).await?;
    if changed == 0 {
        debug!("Delete of event {} by {} matched nothing", id, owner);
    }

    Ok(Json(SUCCESS))
}

/// POST /delete_all
pub async fn delete_all(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
) -> ApiResult<Html<String>> {
    let owner = account.id;
    let removed = blocking(&state, move |s| Ok(s.db.delete_all_events(&owner)?)).await?;
    info!("Account '{}' deleted all {} events", account.username, removed);

    Ok(pages::alert_and_return(DELETED_ALL))
}

/// POST /upload_csv: multipart form with a `csv_file` field.
pub async fn upload_csv(
    State(state): State<AppState>,
    Extension(account): Extension<Account>,
    multipart: Multipart,
) -> ApiResult<Html<String>> {
    let Some(data) = read_upload(multipart).await else {
        return Ok(pages::alert_and_return(UPLOAD_UNSUPPORTED));
    };

    let events = match parse_csv(&data) {
        Ok(events) => events,
        Err(e) => {
            warn!("Rejected import from '{}': {}", account.username, e);
            return Ok(pages::alert_and_return(&format!(
                "The schedule could not be imported: {}",
                e
            )));
        }
    };

    for event in events.iter().filter(|e| e.is_inverted()) {
        warn!("Imported event '{}' ends before it starts", event.title);
    }

    let owner = account.id;
    let count = blocking(&state, move |s| Ok(s.db.bulk_insert_events(&owner, &events)?)).await?;
    info!("Account '{}' imported {} events", account.username, count);

    Ok(pages::alert_and_return(UPLOAD_OK))
}

/// Pulls the upload field out of the form. `None` when it is missing, not a
/// `.csv`, or the body is malformed.
async fn read_upload(mut multipart: Multipart) -> Option<Vec<u8>> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                warn!("Malformed multipart upload: {}", e);
                return None;
            }
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        if !field.file_name().is_some_and(is_csv_filename) {
            return None;
        }

        return match field.bytes().await {
            Ok(bytes) => Some(bytes.to_vec()),
            Err(e) => {
                warn!("Failed to read upload: {}", e);
                None
            }
        };
    }
}

fn new_event(title: String, start: &str, end: &str) -> ApiResult<NewEvent> {
    let start = parse_form_timestamp(start).map_err(|e| ApiError::validation(e.to_string()))?;
    let end = parse_form_timestamp(end).map_err(|e| ApiError::validation(e.to_string()))?;

    let event = NewEvent { title, start, end };
    if event.is_inverted() {
        warn!("Event '{}' ends before it starts", event.title);
    }
    Ok(event)
}
