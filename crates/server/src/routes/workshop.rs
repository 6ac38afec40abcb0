//! Agenda, quotes, service orders and the paperwork attached to them.
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use models::appointment::{self, AppointmentStatus};
use models::service_order::OrderStatus;
use models::{checklist, quote, time};
use serde::Deserialize;
use service::access::Actor;
use service::appointments::{self, AppointmentInput, AppointmentView};
use service::checklists::{self, ChecklistInput};
use service::quotes::{self, Approval, ItemInput, QuoteDetail, QuoteInput};
use service::reports::{self, ReportInput, ReportView};
use service::service_orders::{self, OrderInput, OrderView};
use uuid::Uuid;

use crate::auth::ServerState;
use crate::errors::JsonApiError;

#[derive(Debug, Deserialize)]
pub struct StatusInput<S> {
    pub status: S,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectInput {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct UpcomingQuery {
    pub mechanic_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ChecklistQuery {
    pub vehicle_id: Option<Uuid>,
}

#[utoipa::path(
    get, path = "/api/appointments", tag = "workshop",
    responses(
        (status = 200, description = "Appointments")
    )
)]
pub async fn list_appointments(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<appointment::Model>>, JsonApiError> {
    Ok(Json(appointments::list_appointments(&state.db, &actor).await?))
}

#[utoipa::path(
    post, path = "/api/appointments", tag = "workshop",
    responses(
        (status = 201, description = "Scheduled"),
        (status = 400, description = "Slot unavailable or invalid")
    )
)]
pub async fn schedule(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<appointment::Model>), JsonApiError> {
    let created = appointments::schedule(&state.db, &actor, input, time::now()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/appointments/upcoming", tag = "workshop",
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Upcoming agenda")
    )
)]
pub async fn upcoming(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<UpcomingQuery>,
) -> Result<Json<Vec<AppointmentView>>, JsonApiError> {
    Ok(Json(appointments::upcoming(&state.db, &actor, time::now(), q.mechanic_id).await?))
}

#[utoipa::path(
    get, path = "/api/appointments/{id}", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Appointment")
    )
)]
pub async fn get_appointment(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<appointment::Model>, JsonApiError> {
    Ok(Json(appointments::get_appointment(&state.db, &actor, id).await?))
}

#[utoipa::path(
    post, path = "/api/appointments/{id}/status", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Invalid Transition")
    )
)]
pub async fn appointment_status(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusInput<AppointmentStatus>>,
) -> Result<Json<appointment::Model>, JsonApiError> {
    Ok(Json(appointments::set_status(&state.db, &actor, id, input.status).await?))
}

#[utoipa::path(get, path = "/api/quotes", tag = "workshop", responses((status = 200, description = "Quotes")))]
pub async fn list_quotes(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<quote::Model>>, JsonApiError> {
    Ok(Json(quotes::list_quotes(&state.db, &actor).await?))
}

#[utoipa::path(post, path = "/api/quotes", tag = "workshop", responses((status = 201, description = "Quote created")))]
pub async fn create_quote(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<QuoteInput>,
) -> Result<(StatusCode, Json<quote::Model>), JsonApiError> {
    let created = quotes::create_quote(&state.db, &actor, input, Utc::now().date_naive()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/quotes/{id}", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Quote with items")
    )
)]
pub async fn get_quote(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuoteDetail>, JsonApiError> {
    Ok(Json(quotes::get_quote(&state.db, &actor, id).await?))
}

#[utoipa::path(
    post, path = "/api/quotes/{id}/items", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Item added, total recomputed")
    )
)]
pub async fn add_quote_item(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<ItemInput>,
) -> Result<Json<QuoteDetail>, JsonApiError> {
    Ok(Json(quotes::add_item(&state.db, &actor, id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/quotes/{id}/items/{item_id}", tag = "workshop",
    params(("id" = Uuid, Path,), ("item_id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Item removed")
    )
)]
pub async fn remove_quote_item(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<QuoteDetail>, JsonApiError> {
    Ok(Json(quotes::remove_item(&state.db, &actor, id, item_id).await?))
}

#[utoipa::path(
    post, path = "/api/quotes/{id}/finalize", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Quote sent to the customer"),
        (status = 400, description = "Quote has no items")
    )
)]
pub async fn finalize_quote(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<quote::Model>, JsonApiError> {
    Ok(Json(quotes::finalize(&state.db, &actor, id).await?))
}

#[utoipa::path(
    post, path = "/api/quotes/{id}/approve", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Approved, service order opened"),
        (status = 400, description = "Already processed")
    )
)]
pub async fn approve_quote(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<Approval>, JsonApiError> {
    Ok(Json(quotes::approve(&state.db, &actor, id, Utc::now().date_naive()).await?))
}

#[utoipa::path(
    post, path = "/api/quotes/{id}/reject", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Rejected"),
        (status = 400, description = "Already processed")
    )
)]
pub async fn reject_quote(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    input: Option<Json<RejectInput>>,
) -> Result<Json<quote::Model>, JsonApiError> {
    let reason = input.and_then(|Json(i)| i.reason);
    Ok(Json(quotes::reject(&state.db, &actor, id, reason).await?))
}

#[utoipa::path(
    get, path = "/api/service-orders", tag = "workshop",
    responses(
        (status = 200, description = "Service orders")
    )
)]
pub async fn list_orders(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<OrderView>>, JsonApiError> {
    Ok(Json(service_orders::list_orders(&state.db, &actor).await?))
}

#[utoipa::path(
    post, path = "/api/service-orders", tag = "workshop",
    responses(
        (status = 201, description = "Service order opened")
    )
)]
pub async fn create_order(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<OrderInput>,
) -> Result<(StatusCode, Json<OrderView>), JsonApiError> {
    let created = service_orders::create_order(&state.db, &actor, input, Utc::now().date_naive()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/api/service-orders/{id}", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Service order with customer-facing status")
    )
)]
pub async fn get_order(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(service_orders::get_order(&state.db, &actor, id).await?))
}

#[utoipa::path(
    post, path = "/api/service-orders/{id}/items", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Item added")
    )
)]
pub async fn add_order_item(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<ItemInput>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(service_orders::add_item(&state.db, &actor, id, input).await?))
}

#[utoipa::path(
    post, path = "/api/service-orders/{id}/status", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Status changed"),
        (status = 400, description = "Invalid transition or insufficient stock")
    )
)]
pub async fn order_status(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusInput<OrderStatus>>,
) -> Result<Json<OrderView>, JsonApiError> {
    Ok(Json(service_orders::set_status(&state.db, &actor, id, input.status).await?))
}

#[utoipa::path(
    get, path = "/api/checklists", tag = "workshop",
    params(ChecklistQuery),
    responses(
        (status = 200, description = "Checklists")
    )
)]
pub async fn list_checklists(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Query(q): Query<ChecklistQuery>,
) -> Result<Json<Vec<checklist::Model>>, JsonApiError> {
    Ok(Json(checklists::list_checklists(&state.db, &actor, q.vehicle_id).await?))
}

#[utoipa::path(
    post, path = "/api/checklists", tag = "workshop",
    responses(
        (status = 201, description = "Checklist created"),
        (status = 409, description = "Order already has a checklist")
    )
)]
pub async fn create_checklist(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<ChecklistInput>,
) -> Result<(StatusCode, Json<checklist::Model>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(checklists::create_checklist(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/checklists/{id}", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Checklist")
    )
)]
pub async fn get_checklist(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<checklist::Model>, JsonApiError> {
    Ok(Json(checklists::get_checklist(&state.db, &actor, id).await?))
}

#[utoipa::path(
    get, path = "/api/reports", tag = "workshop",
    responses(
        (status = 200, description = "Technical reports")
    )
)]
pub async fn list_reports(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<ReportView>>, JsonApiError> {
    Ok(Json(reports::list_reports(&state.db, &actor).await?))
}

#[utoipa::path(
    post, path = "/api/reports", tag = "workshop",
    responses(
        (status = 201, description = "Report created")
    )
)]
pub async fn create_report(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<ReportInput>,
) -> Result<(StatusCode, Json<ReportView>), JsonApiError> {
    Ok((StatusCode::CREATED, Json(reports::create_report(&state.db, &actor, input).await?)))
}

#[utoipa::path(
    get, path = "/api/reports/{id}", tag = "workshop",
    params(("id" = Uuid, Path,)),
    responses(
        (status = 200, description = "Report with parts used")
    )
)]
pub async fn get_report(
    State(state): State<ServerState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportView>, JsonApiError> {
    Ok(Json(reports::get_report(&state.db, &actor, id).await?))
}
