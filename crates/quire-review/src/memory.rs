//! In-memory pull request store.

use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use quire_types::{DocumentRef, PullRequestId, UserId};

use crate::audit::{AuditEntry, AuditTrail};
use crate::error::{ReviewError, ReviewResult};
use crate::pull_request::PullRequest;
use crate::traits::PullRequestStore;

/// An in-memory implementation of [`PullRequestStore`].
#[derive(Debug, Default)]
pub struct InMemoryPullRequestStore {
    requests: RwLock<HashMap<PullRequestId, PullRequest>>,
    trails: RwLock<HashMap<PullRequestId, AuditTrail>>,
}

impl InMemoryPullRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn list_where(&self, keep: impl Fn(&PullRequest) -> bool) -> Vec<PullRequest> {
        let requests = self.requests.read().expect("lock poisoned");
        let mut result: Vec<PullRequest> = requests.values().filter(|pr| keep(pr)).cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        result
    }
}

impl PullRequestStore for InMemoryPullRequestStore {
    fn insert(&self, pull_request: PullRequest) -> ReviewResult<()> {
        let mut requests = self.requests.write().expect("lock poisoned");
        if requests.contains_key(&pull_request.id) {
            return Err(ReviewError::AlreadyExists(pull_request.id));
        }
        debug!(pull_request = %pull_request.id, target = %pull_request.target, "stored pull request");
        self.trails
            .write()
            .expect("lock poisoned")
            .insert(pull_request.id, AuditTrail::new(pull_request.id));
        requests.insert(pull_request.id, pull_request);
        Ok(())
    }

    fn get(&self, id: &PullRequestId) -> ReviewResult<Option<PullRequest>> {
        Ok(self.requests.read().expect("lock poisoned").get(id).cloned())
    }

    fn update(&self, pull_request: PullRequest) -> ReviewResult<()> {
        let mut requests = self.requests.write().expect("lock poisoned");
        let stored = requests
            .get_mut(&pull_request.id)
            .ok_or(ReviewError::NotFound(pull_request.id))?;
        stored.ensure_pending()?;
        debug!(pull_request = %pull_request.id, status = %pull_request.status, "updated pull request");
        *stored = pull_request;
        Ok(())
    }

    fn list_for_target(&self, document: &DocumentRef) -> ReviewResult<Vec<PullRequest>> {
        Ok(self.list_where(|pr| &pr.target == document))
    }

    fn list_by_requester(&self, requester: &UserId) -> ReviewResult<Vec<PullRequest>> {
        Ok(self.list_where(|pr| &pr.requester == requester))
    }

    fn record(&self, id: &PullRequestId, entry: AuditEntry) -> ReviewResult<()> {
        let mut trails = self.trails.write().expect("lock poisoned");
        let trail = trails.get_mut(id).ok_or(ReviewError::NotFound(*id))?;
        trail.push(entry);
        Ok(())
    }

    fn audit(&self, id: &PullRequestId) -> ReviewResult<AuditTrail> {
        self.trails
            .read()
            .expect("lock poisoned")
            .get(id)
            .cloned()
            .ok_or(ReviewError::NotFound(*id))
    }
}
