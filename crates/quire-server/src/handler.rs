use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use quire_sdk::{
    CommitId, CommitSummary, DiffResult, DocumentRef, DocumentSummary, DocumentView, Engine,
    ForkResult, MergeRequested, NewDocument, PullOutcome, PullRequest, PullRequestId, SaveResult,
    UserId,
};

use crate::error::ServerResult;
use crate::payload::{
    ActionPullRequestPayload, ActionRequest, AllDocsQuery, CopyDocPayload, CopyRequest,
    CreateDocPayload, DocPayload, MergeRequest, PastVersionPayload, PastVersionRequest,
    PullRequestPayload, RequestMergePayload, SaveDocPayload, SaveRequest,
};

pub type AppState = Arc<Engine>;

/// Most commits returned by the history route.
const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentResponse {
    pub content: String,
}

/// A newly created document, keyed the way clients name it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub doc_name: String,
    #[serde(flatten)]
    pub document: DocumentSummary,
}

impl From<DocumentSummary> for CreatedResponse {
    fn from(document: DocumentSummary) -> Self {
        Self {
            doc_name: document.name.as_str().to_string(),
            document,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResponse {
    pub current_commit: CommitId,
    pub document: DocumentSummary,
}

impl From<SaveResult> for SavedResponse {
    fn from(r: SaveResult) -> Self {
        Self {
            current_commit: r.commit,
            document: r.document,
        }
    }
}

/// The new fork plus every document its owner now holds.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopiedResponse {
    pub fork: DocumentSummary,
    pub all_documents: Vec<DocumentSummary>,
}

impl From<ForkResult> for CopiedResponse {
    fn from(r: ForkResult) -> Self {
        Self {
            fork: r.fork,
            all_documents: r.documents,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequestedResponse {
    pub confirmation: String,
    pub pull_request: PullRequest,
}

impl From<MergeRequested> for MergeRequestedResponse {
    fn from(r: MergeRequested) -> Self {
        Self {
            confirmation: r.confirmation,
            pull_request: r.pull_request,
        }
    }
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn create_doc(
    State(engine): State<AppState>,
    Json(payload): Json<CreateDocPayload>,
) -> ServerResult<Json<CreatedResponse>> {
    let request = NewDocument::try_from(payload)?;
    Ok(Json(engine.create_document(request)?.into()))
}

pub async fn save_doc(
    State(engine): State<AppState>,
    Json(payload): Json<SaveDocPayload>,
) -> ServerResult<Json<SavedResponse>> {
    let r = SaveRequest::try_from(payload)?;
    let saved = engine.save(
        &r.document,
        &r.author,
        &r.content,
        r.message,
        r.expected_head,
    )?;
    Ok(Json(saved.into()))
}

pub async fn past_version(
    State(engine): State<AppState>,
    Json(payload): Json<PastVersionPayload>,
) -> ServerResult<Json<ContentResponse>> {
    let r = PastVersionRequest::try_from(payload)?;
    let content = engine.checkout(&r.document, &r.commit)?;
    Ok(Json(ContentResponse { content }))
}

pub async fn copy_doc(
    State(engine): State<AppState>,
    Json(payload): Json<CopyDocPayload>,
) -> ServerResult<Json<CopiedResponse>> {
    let r = CopyRequest::try_from(payload)?;
    Ok(Json(engine.fork_document(&r.source, &r.new_owner)?.into()))
}

pub async fn open_doc(
    State(engine): State<AppState>,
    Json(payload): Json<DocPayload>,
) -> ServerResult<Json<DocumentView>> {
    let document = DocumentRef::try_from(payload)?;
    Ok(Json(engine.open_document(&document)?))
}

pub async fn all_docs(
    State(engine): State<AppState>,
    Query(query): Query<AllDocsQuery>,
) -> ServerResult<Json<Vec<DocumentSummary>>> {
    let owner = UserId::new(&query.username)?;
    Ok(Json(engine.all_documents(&owner)?))
}

pub async fn history(
    State(engine): State<AppState>,
    Json(payload): Json<DocPayload>,
) -> ServerResult<Json<Vec<CommitSummary>>> {
    let document = DocumentRef::try_from(payload)?;
    Ok(Json(engine.log(&document, HISTORY_LIMIT)?))
}

pub async fn review_upstream(
    State(engine): State<AppState>,
    Json(payload): Json<DocPayload>,
) -> ServerResult<Json<DiffResult>> {
    let fork = DocumentRef::try_from(payload)?;
    Ok(Json(engine.review_upstream(&fork)?))
}

pub async fn get_upstream(
    State(engine): State<AppState>,
    Json(payload): Json<DocPayload>,
) -> ServerResult<Json<PullOutcome>> {
    let fork = DocumentRef::try_from(payload)?;
    Ok(Json(engine.pull_upstream(&fork)?))
}

pub async fn request_merge(
    State(engine): State<AppState>,
    Json(payload): Json<RequestMergePayload>,
) -> ServerResult<Json<MergeRequestedResponse>> {
    let r = MergeRequest::try_from(payload)?;
    let requested = engine.request_merge(&r.requester, &r.document, r.commit, r.message)?;
    Ok(Json(requested.into()))
}

pub async fn review_pull_request(
    State(engine): State<AppState>,
    Json(payload): Json<PullRequestPayload>,
) -> ServerResult<Json<DiffResult>> {
    let id = PullRequestId::try_from(payload)?;
    Ok(Json(engine.review_pull_request(&id)?))
}

pub async fn action_pull_request(
    State(engine): State<AppState>,
    Json(payload): Json<ActionPullRequestPayload>,
) -> ServerResult<Json<PullRequest>> {
    let r = ActionRequest::try_from(payload)?;
    Ok(Json(engine.action_pull_request(
        &r.id,
        r.owner_message,
        r.decision,
    )?))
}
