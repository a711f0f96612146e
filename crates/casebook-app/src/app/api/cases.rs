//! Case endpoints: intake, listing, reads, partial updates, deletion, and
//! the status lifecycle.

use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Depot, Request, Response, Router, handler};
use serde::{Deserialize, Deserializer};

use casebook_db::db::enums::{BankIssue, CasePriority, CaseStatus, CustomFieldKind, LoanType};
use casebook_db::db::query::case::CaseFilter;
use casebook_db::model::case::CaseRecord;
use casebook_db::model::timeline::TimelineEntry;
use casebook_service::case_record::intake::{CreateCaseContext, create_case};
use casebook_service::case_record::read::{CaseView, get_case, list_cases};
use casebook_service::case_record::update::{CasePatch, update_case};
use casebook_service::case_record::{BankDetailInput, CustomFieldInput, ReferralInput, delete};
use casebook_service::lifecycle;

use crate::app::api::{documents, threads, uuid_param};
use crate::db_handler::get_db_from_depot;
use crate::error::{AppError, AppResult};
use crate::middleware::identity::get_actor_from_depot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BankDetailBody {
    bank_name: String,
    #[serde(default)]
    account_number: Option<String>,
    #[serde(default)]
    loan_type: Option<LoanType>,
    #[serde(default)]
    issues: Vec<BankIssue>,
}

impl From<BankDetailBody> for BankDetailInput {
    fn from(body: BankDetailBody) -> Self {
        Self {
            bank_name: body.bank_name,
            account_number: body.account_number,
            loan_type: body.loan_type,
            issues: body.issues,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CustomFieldBody {
    label: String,
    #[serde(rename = "type")]
    kind: CustomFieldKind,
    value: serde_json::Value,
}

impl From<CustomFieldBody> for CustomFieldInput {
    fn from(body: CustomFieldBody) -> Self {
        Self {
            label: body.label,
            kind: body.kind,
            value: body.value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReferralBody {
    name: String,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCaseBody {
    name: String,
    phone: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    aadhaar: Option<String>,
    #[serde(default)]
    pan: Option<String>,
    #[serde(default)]
    cibil_score: Option<i32>,
    problem: String,
    #[serde(default)]
    banks: Vec<String>,
    #[serde(default)]
    other_banks: Vec<String>,
    #[serde(default)]
    bank_details: Vec<BankDetailBody>,
    #[serde(default)]
    custom_fields: Vec<CustomFieldBody>,
    #[serde(default)]
    referral: Option<ReferralBody>,
    #[serde(default)]
    priority: Option<CasePriority>,
    #[serde(default)]
    follow_up_date: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    assigned_to: Option<uuid::Uuid>,
}

impl From<CreateCaseBody> for CreateCaseContext {
    fn from(body: CreateCaseBody) -> Self {
        Self {
            customer_name: body.name,
            phone: body.phone,
            email: body.email,
            aadhaar: body.aadhaar,
            pan: body.pan,
            cibil_score: body.cibil_score,
            problem: body.problem,
            banks: body.banks,
            other_banks: body.other_banks,
            bank_details: body.bank_details.into_iter().map(Into::into).collect(),
            custom_fields: body.custom_fields.into_iter().map(Into::into).collect(),
            referral: body.referral.map(|r| ReferralInput {
                name: r.name,
                phone: r.phone,
            }),
            priority: body.priority,
            follow_up_date: body.follow_up_date,
            assigned_to: body.assigned_to,
        }
    }
}

/// Distinguishes an absent patch field from an explicit JSON null.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PatchCaseBody {
    name: Option<String>,
    phone: Option<String>,
    #[serde(deserialize_with = "explicit_null")]
    email: Option<Option<String>>,
    #[serde(deserialize_with = "explicit_null")]
    aadhaar: Option<Option<String>>,
    #[serde(deserialize_with = "explicit_null")]
    pan: Option<Option<String>>,
    #[serde(deserialize_with = "explicit_null")]
    cibil_score: Option<Option<i32>>,
    problem: Option<String>,
    banks: Option<Vec<String>>,
    other_banks: Option<Vec<String>>,
    bank_details: Option<Vec<BankDetailBody>>,
    custom_fields: Option<Vec<CustomFieldBody>>,
    #[serde(deserialize_with = "explicit_null")]
    assigned_to: Option<Option<uuid::Uuid>>,
    priority: Option<CasePriority>,
    #[serde(deserialize_with = "explicit_null")]
    follow_up_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
    #[serde(deserialize_with = "explicit_null")]
    resolution_date: Option<Option<chrono::DateTime<chrono::Utc>>>,
}

impl From<PatchCaseBody> for CasePatch {
    fn from(body: PatchCaseBody) -> Self {
        Self {
            customer_name: body.name,
            phone: body.phone,
            email: body.email,
            aadhaar: body.aadhaar,
            pan: body.pan,
            cibil_score: body.cibil_score,
            problem: body.problem,
            banks: body.banks,
            other_banks: body.other_banks,
            bank_details: body
                .bank_details
                .map(|d| d.into_iter().map(Into::into).collect()),
            custom_fields: body
                .custom_fields
                .map(|f| f.into_iter().map(Into::into).collect()),
            assigned_to: body.assigned_to,
            priority: body.priority,
            follow_up_date: body.follow_up_date,
            resolution_date: body.resolution_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransitionBody {
    status: CaseStatus,
}

async fn parse_body<T: for<'de> Deserialize<'de>>(req: &mut Request) -> AppResult<T> {
    req.parse_json::<T>()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid request body: {e}")))
}

fn filter_from_query(req: &Request) -> AppResult<CaseFilter> {
    let mut filter = CaseFilter::default();

    if let Some(status) = req.query::<String>("status") {
        filter.status = Some(
            status
                .parse::<CaseStatus>()
                .map_err(|_| AppError::BadRequest(format!("unrecognized status '{status}'")))?,
        );
    }
    if let Some(priority) = req.query::<String>("priority") {
        filter.priority = Some(
            priority
                .parse::<CasePriority>()
                .map_err(|_| AppError::BadRequest(format!("unrecognized priority '{priority}'")))?,
        );
    }
    if let Some(assignee) = req.query::<String>("assignedTo") {
        filter.assigned_to = Some(
            assignee
                .parse()
                .map_err(|_| AppError::BadRequest("assignedTo must be a valid uuid".to_owned()))?,
        );
    }
    if let Some(referral) = req.query::<String>("referralId") {
        filter.referral_id = Some(
            referral
                .parse()
                .map_err(|_| AppError::BadRequest("referralId must be a valid uuid".to_owned()))?,
        );
    }
    if let Some(after) = req.query::<String>("createdAfter") {
        filter.created_after = Some(after.parse().map_err(|_| {
            AppError::BadRequest("createdAfter must be an RFC 3339 timestamp".to_owned())
        })?);
    }
    if let Some(before) = req.query::<String>("createdBefore") {
        filter.created_before = Some(before.parse().map_err(|_| {
            AppError::BadRequest("createdBefore must be an RFC 3339 timestamp".to_owned())
        })?);
    }

    Ok(filter)
}

/// POST /api/cases
#[handler]
async fn create_case_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<Json<CaseView>> {
    let actor = get_actor_from_depot(depot)?;
    let body: CreateCaseBody = parse_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    let created = create_case(&mut conn, &actor, &body.into()).await?;
    let view = get_case(&mut conn, created.case.id).await?;

    res.status_code(StatusCode::CREATED);
    Ok(Json(view))
}

/// GET /api/cases
#[handler]
async fn list_cases_handler(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Vec<CaseRecord>>> {
    let filter = filter_from_query(req)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(list_cases(&mut conn, &filter).await?))
}

/// GET /api/cases/{id}
#[handler]
async fn get_case_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<CaseView>> {
    let case_id = uuid_param(req, "case_id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(get_case(&mut conn, case_id).await?))
}

/// PATCH /api/cases/{id}
#[handler]
async fn patch_case_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<CaseView>> {
    let case_id = uuid_param(req, "case_id")?;
    let actor = get_actor_from_depot(depot)?;
    let body: PatchCaseBody = parse_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    update_case(&mut conn, case_id, &body.into(), &actor).await?;
    Ok(Json(get_case(&mut conn, case_id).await?))
}

/// DELETE /api/cases/{id}
#[handler]
async fn delete_case_handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> AppResult<()> {
    let case_id = uuid_param(req, "case_id")?;
    let actor = get_actor_from_depot(depot)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    delete::delete_case(&mut conn, case_id, &actor).await?;
    res.status_code(StatusCode::NO_CONTENT);
    Ok(())
}

/// POST /api/cases/{id}/transition
#[handler]
async fn transition_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<CaseRecord>> {
    let case_id = uuid_param(req, "case_id")?;
    let actor = get_actor_from_depot(depot)?;
    let body: TransitionBody = parse_body(req).await?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(
        lifecycle::transition(&mut conn, case_id, body.status, &actor).await?,
    ))
}

/// POST /api/cases/{id}/reopen
#[handler]
async fn reopen_handler(req: &mut Request, depot: &mut Depot) -> AppResult<Json<CaseRecord>> {
    let case_id = uuid_param(req, "case_id")?;
    let actor = get_actor_from_depot(depot)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(lifecycle::reopen(&mut conn, case_id, &actor).await?))
}

/// GET /api/cases/{id}/timeline
#[handler]
async fn timeline_handler(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<Vec<TimelineEntry>>> {
    let case_id = uuid_param(req, "case_id")?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(Json(lifecycle::case_timeline(&mut conn, case_id).await?))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("cases")
        .get(list_cases_handler)
        .post(create_case_handler)
        .push(
            Router::with_path("<case_id>")
                .get(get_case_handler)
                .patch(patch_case_handler)
                .delete(delete_case_handler)
                .push(Router::with_path("transition").post(transition_handler))
                .push(Router::with_path("reopen").post(reopen_handler))
                .push(Router::with_path("timeline").get(timeline_handler))
                .push(documents::routes())
                .push(threads::case_routes()),
        )
}
