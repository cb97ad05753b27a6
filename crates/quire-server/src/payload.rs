//! Wire payloads for the `/api/doc` routes and their validated forms.
//!
//! Clients send loosely typed JSON with camelCase keys. Each payload is
//! converted with `TryFrom` into a request holding validated domain types
//! before it reaches the engine.

use serde::Deserialize;

use quire_sdk::{
    CommitId, Decision, DocumentName, DocumentRef, NewDocument, PullRequestId, UserId, Visibility,
};

use crate::error::ServerError;

/// Empty or whitespace-only messages count as absent.
fn message(raw: Option<String>) -> Option<String> {
    raw.filter(|m| !m.trim().is_empty())
}

fn document(owner: &str, name: &str) -> Result<DocumentRef, ServerError> {
    Ok(DocumentRef::parse(owner, name)?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocPayload {
    pub username: String,
    pub doc_name: String,
    #[serde(default)]
    pub doc_description: String,
    pub doc_type: Option<String>,
    #[serde(default)]
    pub doc_content: String,
    pub commit_message: Option<String>,
}

impl TryFrom<CreateDocPayload> for NewDocument {
    type Error = ServerError;

    fn try_from(p: CreateDocPayload) -> Result<Self, Self::Error> {
        let visibility = match p.doc_type.as_deref() {
            Some(raw) => raw.parse::<Visibility>()?,
            None => Visibility::default(),
        };
        let mut request = NewDocument::new(UserId::new(&p.username)?, DocumentName::new(&p.doc_name)?)
            .description(p.doc_description)
            .visibility(visibility)
            .content(p.doc_content);
        if let Some(m) = message(p.commit_message) {
            request = request.message(m);
        }
        Ok(request)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocPayload {
    pub username: String,
    pub doc_name: String,
    /// Owner of the document; defaults to `username`.
    pub doc_owner: Option<String>,
    pub doc_content: String,
    pub commit_message: Option<String>,
    /// Head the client last saw. Rejected with 409 if the head has moved.
    #[serde(rename = "commitID")]
    pub commit_id: Option<String>,
}

#[derive(Debug)]
pub struct SaveRequest {
    pub author: UserId,
    pub document: DocumentRef,
    pub content: String,
    pub message: Option<String>,
    pub expected_head: Option<CommitId>,
}

impl TryFrom<SaveDocPayload> for SaveRequest {
    type Error = ServerError;

    fn try_from(p: SaveDocPayload) -> Result<Self, Self::Error> {
        let owner = p.doc_owner.as_deref().unwrap_or(&p.username);
        Ok(Self {
            author: UserId::new(&p.username)?,
            document: document(owner, &p.doc_name)?,
            content: p.doc_content,
            message: message(p.commit_message),
            expected_head: p.commit_id.as_deref().map(CommitId::from_hex).transpose()?,
        })
    }
}

/// Names a document. `docOwner` defaults to `username`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocPayload {
    pub username: String,
    pub doc_name: String,
    pub doc_owner: Option<String>,
}

impl TryFrom<DocPayload> for DocumentRef {
    type Error = ServerError;

    fn try_from(p: DocPayload) -> Result<Self, Self::Error> {
        document(p.doc_owner.as_deref().unwrap_or(&p.username), &p.doc_name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastVersionPayload {
    pub username: String,
    pub doc_name: String,
    pub doc_owner: Option<String>,
    #[serde(rename = "commitID")]
    pub commit_id: String,
}

#[derive(Debug)]
pub struct PastVersionRequest {
    pub document: DocumentRef,
    pub commit: CommitId,
}

impl TryFrom<PastVersionPayload> for PastVersionRequest {
    type Error = ServerError;

    fn try_from(p: PastVersionPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            document: document(p.doc_owner.as_deref().unwrap_or(&p.username), &p.doc_name)?,
            commit: CommitId::from_hex(&p.commit_id)?,
        })
    }
}

/// `username` forks `docOwner`'s document `docName`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyDocPayload {
    pub username: String,
    pub doc_owner: String,
    pub doc_name: String,
}

#[derive(Debug)]
pub struct CopyRequest {
    pub source: DocumentRef,
    pub new_owner: UserId,
}

impl TryFrom<CopyDocPayload> for CopyRequest {
    type Error = ServerError;

    fn try_from(p: CopyDocPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            source: document(&p.doc_owner, &p.doc_name)?,
            new_owner: UserId::new(&p.username)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AllDocsQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMergePayload {
    pub username: String,
    pub doc_name: String,
    #[serde(rename = "commitID")]
    pub commit_id: String,
    pub collaborator_message: Option<String>,
}

#[derive(Debug)]
pub struct MergeRequest {
    pub requester: UserId,
    pub document: DocumentRef,
    pub commit: CommitId,
    pub message: Option<String>,
}

impl TryFrom<RequestMergePayload> for MergeRequest {
    type Error = ServerError;

    fn try_from(p: RequestMergePayload) -> Result<Self, Self::Error> {
        Ok(Self {
            requester: UserId::new(&p.username)?,
            document: document(&p.username, &p.doc_name)?,
            commit: CommitId::from_hex(&p.commit_id)?,
            message: message(p.collaborator_message),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PullRequestPayload {
    #[serde(rename = "pullRequestID")]
    pub pull_request_id: String,
}

impl TryFrom<PullRequestPayload> for PullRequestId {
    type Error = ServerError;

    fn try_from(p: PullRequestPayload) -> Result<Self, Self::Error> {
        Ok(p.pull_request_id.parse()?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPullRequestPayload {
    #[serde(rename = "pullRequestID")]
    pub pull_request_id: String,
    pub merge_status: String,
    pub owner_message: Option<String>,
}

#[derive(Debug)]
pub struct ActionRequest {
    pub id: PullRequestId,
    pub decision: Decision,
    pub owner_message: Option<String>,
}

impl TryFrom<ActionPullRequestPayload> for ActionRequest {
    type Error = ServerError;

    fn try_from(p: ActionPullRequestPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            id: p.pull_request_id.parse()?,
            decision: p.merge_status.parse()?,
            owner_message: message(p.owner_message),
        })
    }
}
