use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiResultExt, Identity};
use crate::application::{AppError, Assignment, Marketplace, ProjectsWithStats};
use crate::domain::{
    BidDraft, BidId, HistoryAction, PaymentStatus, ProjectDraft, ProjectId, ProjectSort,
    ProjectStatus, ProjectUpdate, UserId,
};

type ApiResult<T> = Result<T, ApiError>;

/// Turns a malformed body into a 400 with the usual `{message}` shape.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}

#[derive(Debug, Default, Deserialize)]
pub struct AvailableParams {
    search: Option<String>,
    #[serde(default)]
    sort: ProjectSort,
}

#[derive(Debug, Default, Deserialize)]
pub struct CloseRequest {
    #[serde(default)]
    permanent: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    developer_id: Option<UserId>,
    bid_id: Option<BidId>,
    // Accepted for compatibility. The outcome is always "assigned" and the
    // start date is stamped on first payment.
    #[allow(dead_code)]
    status: Option<String>,
    #[allow(dead_code)]
    start_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressRequest {
    progress: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    status: Option<ProjectStatus>,
}

pub async fn create_project(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    payload: Result<Json<ProjectDraft>, JsonRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error creating project";

    let draft = body(payload).context(CONTEXT)?;
    let project = app
        .projects
        .create_project(&caller, draft)
        .await
        .context(CONTEXT)?;
    let view = app.projects.render(project).await.context(CONTEXT)?;

    Ok((StatusCode::CREATED, Json(view)).into_response())
}

pub async fn list_projects(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching projects";

    let projects = app.projects.list_my_projects(&caller).await.context(CONTEXT)?;
    let views = app.projects.render_all(projects).await.context(CONTEXT)?;
    Ok(Json(views).into_response())
}

pub async fn available_projects(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    params: Result<Query<AvailableParams>, QueryRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching available projects";

    let Query(params) = params
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
        .context(CONTEXT)?;
    let projects = app
        .projects
        .available_projects(&caller, params.search, params.sort)
        .await
        .context(CONTEXT)?;
    let views = app.projects.render_all(projects).await.context(CONTEXT)?;
    Ok(Json(views).into_response())
}

pub async fn developer_history(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching project history";

    let (projects, stats) = app.reports.developer_history(&caller).await.context(CONTEXT)?;
    let projects = app.projects.render_all(projects).await.context(CONTEXT)?;
    Ok(Json(ProjectsWithStats { projects, stats }).into_response())
}

pub async fn assigned_projects(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching assigned projects";

    let (projects, stats) = app.reports.assigned_projects(&caller).await.context(CONTEXT)?;
    let projects = app.projects.render_all(projects).await.context(CONTEXT)?;
    Ok(Json(ProjectsWithStats { projects, stats }).into_response())
}

pub async fn active_projects(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching active projects";

    let projects = app.reports.active_projects(&caller).await.context(CONTEXT)?;
    let views = app.projects.render_all(projects).await.context(CONTEXT)?;
    Ok(Json(views).into_response())
}

pub async fn invoice_projects(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching invoice projects";

    let projects = app.reports.invoice_projects(&caller).await.context(CONTEXT)?;
    let views = app.projects.render_all(projects).await.context(CONTEXT)?;
    Ok(Json(views).into_response())
}

pub async fn find_work_invoices(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching invoice projects";

    let projects = app.reports.find_work_invoices(&caller).await.context(CONTEXT)?;
    let views = app.projects.render_all(projects).await.context(CONTEXT)?;
    Ok(Json(views).into_response())
}

pub async fn assigned_by_me(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching assigned projects";

    let projects = app.reports.assigned_by_me(&caller).await.context(CONTEXT)?;
    let views = app.projects.render_all(projects).await.context(CONTEXT)?;
    Ok(Json(views).into_response())
}

pub async fn get_project(
    State(app): State<Marketplace>,
    Identity(_caller): Identity,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error fetching project";

    let project = app
        .projects
        .get_project(&ProjectId::from(id))
        .await
        .context(CONTEXT)?;
    let view = app.projects.render(project).await.context(CONTEXT)?;
    Ok(Json(view).into_response())
}

pub async fn update_project(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
    payload: Result<Json<ProjectUpdate>, JsonRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error updating project";

    let update = body(payload).enveloped(CONTEXT)?;
    let project = app
        .projects
        .update_project(&caller, &ProjectId::from(id), update)
        .await
        .enveloped(CONTEXT)?;
    let view = app.projects.render(project).await.enveloped(CONTEXT)?;

    Ok(Json(json!({
        "success": true,
        "message": "Project updated successfully",
        "data": view,
    }))
    .into_response())
}

pub async fn delete_project(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    app.projects
        .delete_project(&caller, &ProjectId::from(id))
        .await
        .context("Error deleting project")?;

    Ok(Json(json!({ "message": "Project deleted successfully" })).into_response())
}

pub async fn close_project(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
    payload: Result<Json<CloseRequest>, JsonRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error closing project";

    // A bare close carries no body
    let request = match payload {
        Err(JsonRejection::MissingJsonContentType(_)) => CloseRequest::default(),
        other => body(other).context(CONTEXT)?,
    };
    let action = app
        .projects
        .close_project(&caller, &ProjectId::from(id), request.permanent)
        .await
        .context(CONTEXT)?;

    let message = match action {
        HistoryAction::Deleted => "Project deleted successfully",
        HistoryAction::Closed => "Project closed successfully",
    };
    Ok(Json(json!({ "message": message })).into_response())
}

pub async fn assign_project(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error assigning project";

    let request = body(payload).enveloped(CONTEXT)?;
    let assignment = Assignment {
        developer: request.developer_id,
        bid: request.bid_id,
    };
    let project = app
        .projects
        .assign_project(&caller, &ProjectId::from(id), assignment)
        .await
        .enveloped(CONTEXT)?;
    let view = app.projects.render(project).await.enveloped(CONTEXT)?;

    Ok(Json(json!({
        "success": true,
        "message": "Project assigned successfully",
        "data": view,
    }))
    .into_response())
}

pub async fn project_history(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let entries = app
        .projects
        .project_history(&caller, &ProjectId::from(id))
        .await
        .context("Error fetching project history")?;
    Ok(Json(entries).into_response())
}

pub async fn submit_bid(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
    payload: Result<Json<BidDraft>, JsonRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error submitting bid";

    let draft = body(payload).context(CONTEXT)?;
    let bid = app
        .bids
        .submit_bid(&caller, &ProjectId::from(id), draft)
        .await
        .context(CONTEXT)?;

    let response = json!({
        "message": "Bid submitted successfully",
        "bid": {
            "_id": bid.id,
            "amount": bid.amount,
            "proposal": bid.proposal,
            "userName": bid.bidder_name,
            "userRole": bid.bidder_role,
            "createdAt": bid.created_at,
        },
    });
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

pub async fn project_bids(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let bids = app
        .bids
        .project_bids(&caller, &ProjectId::from(id))
        .await
        .context("Error fetching bids")?;
    Ok(Json(bids).into_response())
}

pub async fn update_payment_status(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error updating payment status";

    let request = body(payload).context(CONTEXT)?;
    let project = app
        .projects
        .update_payment_status(&caller, &ProjectId::from(id), request.payment_status)
        .await
        .context(CONTEXT)?;
    let view = app.projects.render(project).await.context(CONTEXT)?;
    Ok(Json(view).into_response())
}

pub async fn update_progress(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
    payload: Result<Json<ProgressRequest>, JsonRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error updating progress";

    let request = body(payload).context(CONTEXT)?;
    let project = app
        .projects
        .update_progress(&caller, &ProjectId::from(id), request.progress)
        .await
        .context(CONTEXT)?;
    let view = app.projects.render(project).await.context(CONTEXT)?;
    Ok(Json(view).into_response())
}

pub async fn change_status(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> ApiResult<Response> {
    const CONTEXT: &str = "Error updating project status";

    let request = body(payload).context(CONTEXT)?;
    let project = app
        .projects
        .change_status(&caller, &ProjectId::from(id), request.status)
        .await
        .context(CONTEXT)?;
    let view = app.projects.render(project).await.context(CONTEXT)?;
    Ok(Json(view).into_response())
}

pub async fn download_invoice(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let invoice = app
        .reports
        .invoice(&caller, &ProjectId::from(id))
        .await
        .context("Error generating invoice")?;

    let disposition = format!("attachment; filename=\"{}\"", invoice.file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        invoice.render(),
    )
        .into_response())
}

pub async fn notifications(
    State(app): State<Marketplace>,
    Identity(caller): Identity,
) -> ApiResult<Response> {
    Ok(Json(app.notifications(&caller.id).await).into_response())
}
