use std::sync::RwLock;

use tracing::{debug, error, info, warn};

use quire_dag::{CommitGraph, CommitMetadata, CommitNode, ParentRef, ParentRelation};
use quire_diff::{diff, DiffResult};
use quire_merge::merge;
use quire_refs::{DocumentRecord, InMemoryDocumentRegistry, RegistryStore, Upstream};
use quire_review::{
    AuditAction, AuditEntry, AuditTrail, InMemoryPullRequestStore, PullRequest, PullRequestStore,
};
use quire_store::{CommitObject, InMemoryObjectStore, ObjectStore, ParentLink};
use quire_types::{
    CommitId, Decision, DocumentRef, HybridLogicalClock, PullRequestId, UserId,
};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::locks::DocumentLocks;
use crate::types::{
    CommitSummary, DocumentSummary, DocumentView, ForkResult, MergeRequested, NewDocument,
    PullOutcome, SaveResult, VerifyReport, INITIAL_COMMIT_MESSAGE, PULL_REQUEST_SENT,
};

/// The Quire repository: documents, their commit logs, and pull requests.
///
/// An `Engine` owns all state. Share it by reference (or `Arc<Engine>`);
/// every operation takes `&self` and is safe to call concurrently.
pub struct Engine {
    config: EngineConfig,
    clock: HybridLogicalClock,
    store: InMemoryObjectStore,
    graph: RwLock<CommitGraph>,
    registry: InMemoryDocumentRegistry,
    pull_requests: InMemoryPullRequestStore,
    locks: DocumentLocks,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            clock: HybridLogicalClock::new(config.node_id),
            config,
            store: InMemoryObjectStore::new(),
            graph: RwLock::new(CommitGraph::new()),
            registry: InMemoryDocumentRegistry::new(),
            pull_requests: InMemoryPullRequestStore::new(),
            locks: DocumentLocks::new(),
        }
    }

    /// An engine with default configuration.
    pub fn in_memory() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- Commit log ----

    /// Store content and append a commit to `document`'s log.
    ///
    /// The first parent must be `document`'s current head; a second parent
    /// makes this a merge commit. Does not move the head.
    fn write_commit(
        &self,
        document: &DocumentRef,
        parents: Vec<ParentLink>,
        author: &UserId,
        message: Option<String>,
        content: &str,
    ) -> EngineResult<CommitId> {
        let content_id = self.store.put_content(content)?;
        let header = CommitObject {
            document: document.clone(),
            parents,
            author: author.clone(),
            message,
            content: content_id,
            timestamp: self.clock.now(),
        };
        let id = CommitId::from_object_id(self.store.put_commit(&header)?);

        let node = CommitNode {
            id,
            document: header.document,
            author: header.author,
            timestamp: header.timestamp,
            parents: header
                .parents
                .into_iter()
                .enumerate()
                .map(|(i, p)| {
                    if i == 0 {
                        ParentRef::sequential(p.document, p.commit)
                    } else {
                        ParentRef::merge(p.document, p.commit)
                    }
                })
                .collect(),
            metadata: CommitMetadata {
                message: header.message,
                content: content_id,
            },
        };
        self.graph.write().expect("lock poisoned").add_node(node)?;
        Ok(id)
    }

    /// Load the text recorded by a commit known to the graph.
    fn content_of(&self, commit: &CommitId) -> EngineResult<String> {
        let content_id = {
            let graph = self.graph.read().expect("lock poisoned");
            graph
                .find(commit)
                .map(|node| node.metadata.content)
                .ok_or(EngineError::CommitNotFound(*commit))?
        };
        match self.store.get_content(&content_id) {
            Ok(content) => Ok(content.text),
            Err(err) => {
                error!(commit = %commit.short_hex(), error = %err, "commit content unreadable");
                Err(EngineError::Corrupted(format!(
                    "content of commit {commit} unreadable: {err}"
                )))
            }
        }
    }

    /// Text at a document's head; a head missing from the graph is corruption.
    fn head_content(&self, record: &DocumentRecord) -> EngineResult<String> {
        match self.content_of(&record.head) {
            Err(EngineError::CommitNotFound(head)) => {
                error!(document = %record.reference, head = %head.short_hex(), "head references a missing commit");
                Err(EngineError::Corrupted(format!(
                    "head of {} references missing commit {head}",
                    record.reference
                )))
            }
            other => other,
        }
    }

    /// Record a new commit on `document` and advance its head.
    ///
    /// With `expected_head`, fails with `HeadMoved` unless the head is still
    /// that commit.
    pub fn save(
        &self,
        document: &DocumentRef,
        author: &UserId,
        content: &str,
        message: Option<String>,
        expected_head: Option<CommitId>,
    ) -> EngineResult<SaveResult> {
        self.locks.with(document, || -> EngineResult<_> {
            let record = self.registry.require(document)?;
            if let Some(expected) = expected_head {
                if expected != record.head {
                    warn!(document = %document, expected = %expected.short_hex(), "save rejected, head moved");
                    return Err(EngineError::HeadMoved {
                        document: document.clone(),
                        expected,
                        actual: record.head,
                    });
                }
            }

            let parents = vec![ParentLink::new(document.clone(), record.head)];
            let commit = self.write_commit(document, parents, author, message, content)?;
            let updated = self.registry.compare_and_swap_head(
                document,
                record.head,
                commit,
                self.clock.now(),
            )?;
            debug!(document = %document, commit = %commit.short_hex(), "saved");

            Ok(SaveResult {
                commit,
                document: updated.into(),
            })
        })
    }

    /// Append a commit to `document` and return its id.
    pub fn commit(
        &self,
        document: &DocumentRef,
        content: &str,
        author: &UserId,
        message: Option<String>,
    ) -> EngineResult<CommitId> {
        Ok(self.save(document, author, content, message, None)?.commit)
    }

    /// The content recorded by any commit.
    pub fn get(&self, commit: &CommitId) -> EngineResult<String> {
        self.content_of(commit)
    }

    /// Commit ids of a document, newest first.
    pub fn history(&self, document: &DocumentRef) -> EngineResult<Vec<CommitId>> {
        self.registry.require(document)?;
        Ok(self.graph.read().expect("lock poisoned").history(document))
    }

    /// Up to `limit` commits of a document, newest first.
    pub fn log(&self, document: &DocumentRef, limit: usize) -> EngineResult<Vec<CommitSummary>> {
        self.registry.require(document)?;
        let graph = self.graph.read().expect("lock poisoned");
        Ok(graph
            .document_log(document)
            .into_iter()
            .take(limit)
            .map(|node| CommitSummary {
                id: node.id,
                author: node.author.clone(),
                message: node.metadata.message.clone(),
                timestamp: node.timestamp,
                parents: node.parents.len(),
            })
            .collect())
    }

    // ---- Documents and forks ----

    pub fn create_document(&self, request: NewDocument) -> EngineResult<DocumentSummary> {
        let document = request.reference();
        self.locks.with(&document, || -> EngineResult<_> {
            if self.registry.contains(&document)? {
                return Err(EngineError::DocumentExists(document.clone()));
            }

            let message = request
                .message
                .clone()
                .unwrap_or_else(|| INITIAL_COMMIT_MESSAGE.to_string());
            let root = self.write_commit(
                &document,
                Vec::new(),
                &request.owner,
                Some(message),
                &request.content,
            )?;
            let record = DocumentRecord::new(
                document.clone(),
                request.description.clone(),
                request.visibility,
                root,
                self.clock.now(),
            );
            self.registry.insert(record.clone())?;

            info!(document = %document, root = %root.short_hex(), "created document");
            Ok(record.into())
        })
    }

    pub fn document(&self, document: &DocumentRef) -> EngineResult<DocumentSummary> {
        Ok(self.registry.require(document)?.into())
    }

    /// A document's summary and its content at head.
    pub fn open_document(&self, document: &DocumentRef) -> EngineResult<DocumentView> {
        let record = self.registry.require(document)?;
        let content = self.head_content(&record)?;
        Ok(DocumentView {
            document: record.into(),
            content,
        })
    }

    /// Content of a past commit of `document`; the head does not move.
    pub fn checkout(&self, document: &DocumentRef, commit: &CommitId) -> EngineResult<String> {
        self.registry.require(document)?;
        if !self
            .graph
            .read()
            .expect("lock poisoned")
            .contains(document, commit)
        {
            return Err(EngineError::CommitNotInDocument {
                commit: *commit,
                document: document.clone(),
            });
        }
        self.content_of(commit)
    }

    /// Copy `source` at its head into a new document owned by `new_owner`.
    pub fn fork_document(&self, source: &DocumentRef, new_owner: &UserId) -> EngineResult<ForkResult> {
        let origin = self.registry.require(source)?;
        let content = self.head_content(&origin)?;
        let fork_ref = source.with_owner(new_owner.clone());

        let fork = self.locks.with(&fork_ref, || -> EngineResult<_> {
            if self.registry.contains(&fork_ref)? {
                return Err(EngineError::DocumentExists(fork_ref.clone()));
            }
            let root = self.write_commit(
                &fork_ref,
                Vec::new(),
                new_owner,
                Some(format!("Forked from {source}")),
                &content,
            )?;
            let record = DocumentRecord::new(
                fork_ref.clone(),
                origin.description.clone(),
                origin.visibility,
                root,
                self.clock.now(),
            )
            .with_upstream(source.clone(), origin.head);
            self.registry.insert(record.clone())?;
            Ok(record)
        })?;

        info!(
            source = %source,
            fork = %fork_ref,
            base = %origin.head.short_hex(),
            "forked document"
        );
        Ok(ForkResult {
            fork: fork.into(),
            documents: self.all_documents(new_owner)?,
        })
    }

    /// Every document `owner` holds, forks included, sorted by name.
    pub fn all_documents(&self, owner: &UserId) -> EngineResult<Vec<DocumentSummary>> {
        Ok(self
            .registry
            .list_owned(owner)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    /// Documents forked from `source`.
    pub fn forks_of(&self, source: &DocumentRef) -> EngineResult<Vec<DocumentSummary>> {
        self.registry.require(source)?;
        Ok(self
            .registry
            .list_forks_of(source)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    // ---- Upstream synchronization ----

    fn fork_record(&self, fork: &DocumentRef) -> EngineResult<(DocumentRecord, Upstream)> {
        let record = self.registry.require(fork)?;
        let upstream = record
            .upstream
            .clone()
            .ok_or_else(|| EngineError::NotAFork(fork.clone()))?;
        Ok((record, upstream))
    }

    /// What changed upstream since the fork's base. No side effects.
    pub fn review_upstream(&self, fork: &DocumentRef) -> EngineResult<DiffResult> {
        let (_, upstream) = self.fork_record(fork)?;
        let source = self.registry.require(&upstream.source)?;
        let base = self.content_of(&upstream.base)?;
        let head = self.head_content(&source)?;
        Ok(diff(&base, &head))
    }

    /// Merge upstream changes into a fork.
    ///
    /// On success records a merge commit on the fork (parents: fork head,
    /// upstream head) and advances the fork's base. On conflict nothing is
    /// written.
    pub fn pull_upstream(&self, fork: &DocumentRef) -> EngineResult<PullOutcome> {
        self.locks.with(fork, || -> EngineResult<_> {
            let (record, upstream) = self.fork_record(fork)?;
            let source = self.registry.require(&upstream.source)?;
            if source.head == upstream.base {
                debug!(fork = %fork, "fork already up to date");
                return Ok(PullOutcome::UpToDate);
            }

            let base = self.content_of(&upstream.base)?;
            let ours = self.head_content(&record)?;
            let theirs = self.head_content(&source)?;
            let outcome = merge(&base, &ours, &theirs, &self.config.merge);

            if !outcome.is_clean() {
                warn!(
                    fork = %fork,
                    upstream = %upstream.source,
                    conflicts = outcome.conflicts.len(),
                    "pull from upstream conflicted"
                );
                return Ok(PullOutcome::Conflicted {
                    conflicts: outcome.conflicts,
                    preview: outcome.content,
                });
            }

            let parents = vec![
                ParentLink::new(fork.clone(), record.head),
                ParentLink::new(upstream.source.clone(), source.head),
            ];
            let commit = self.write_commit(
                fork,
                parents,
                record.owner(),
                Some(format!("Merged upstream changes from {}", upstream.source)),
                &outcome.content,
            )?;
            self.registry
                .advance_fork(fork, record.head, commit, source.head, self.clock.now())?;

            info!(
                fork = %fork,
                commit = %commit.short_hex(),
                base = %source.head.short_hex(),
                "merged upstream into fork"
            );
            Ok(PullOutcome::Merged {
                commit,
                content: outcome.content,
            })
        })
    }

    /// Merge a pull request's source commit into its target.
    ///
    /// Caller holds the target's lock.
    fn merge_into_upstream(&self, pull_request: &PullRequest) -> EngineResult<CommitId> {
        let target = self.registry.require(&pull_request.target)?;
        let base = self.content_of(&pull_request.base)?;
        let theirs = self.content_of(&pull_request.source_commit)?;
        let ours = self.head_content(&target)?;

        let outcome = merge(&base, &theirs, &ours, &self.config.merge);
        if !outcome.is_clean() {
            warn!(
                pull_request = %pull_request.id,
                target = %pull_request.target,
                conflicts = outcome.conflicts.len(),
                "pull request merge conflicted"
            );
            return Err(EngineError::MergeConflict {
                conflicts: outcome.conflicts,
            });
        }

        let parents = vec![
            ParentLink::new(pull_request.target.clone(), target.head),
            ParentLink::new(pull_request.source.clone(), pull_request.source_commit),
        ];
        let commit = self.write_commit(
            &pull_request.target,
            parents,
            target.owner(),
            Some(format!(
                "Merged pull request {} from {}",
                pull_request.id.short_id(),
                pull_request.requester
            )),
            &outcome.content,
        )?;
        self.registry.compare_and_swap_head(
            &pull_request.target,
            target.head,
            commit,
            self.clock.now(),
        )?;
        Ok(commit)
    }

    // ---- Pull requests ----

    /// Propose merging `source_commit` of the fork `document` upstream.
    pub fn request_merge(
        &self,
        requester: &UserId,
        document: &DocumentRef,
        source_commit: CommitId,
        message: Option<String>,
    ) -> EngineResult<MergeRequested> {
        if &document.owner != requester {
            return Err(EngineError::Validation(format!(
                "{requester} cannot request a merge from {document}, which they do not own"
            )));
        }
        let (_, upstream) = self.fork_record(document)?;
        self.registry.require(&upstream.source)?;
        if !self
            .graph
            .read()
            .expect("lock poisoned")
            .contains(document, &source_commit)
        {
            return Err(EngineError::CommitNotInDocument {
                commit: source_commit,
                document: document.clone(),
            });
        }

        let base = self.synced_base(document, source_commit, &upstream)?;
        let pull_request = PullRequest::new(
            requester.clone(),
            document.clone(),
            upstream.source,
            source_commit,
            base,
            message,
            self.clock.now(),
        );
        self.pull_requests.insert(pull_request.clone())?;
        self.pull_requests.record(
            &pull_request.id,
            AuditEntry::new(
                AuditAction::Requested,
                requester.clone(),
                pull_request.created_at,
                format!(
                    "{requester} requested merging {} into {}",
                    source_commit.short_hex(),
                    pull_request.target
                ),
            ),
        )?;

        info!(
            pull_request = %pull_request.id,
            source = %document,
            target = %pull_request.target,
            "pull request opened"
        );
        Ok(MergeRequested {
            pull_request,
            confirmation: PULL_REQUEST_SENT.to_string(),
        })
    }

    /// The upstream commit `commit` was last synchronized with.
    ///
    /// Follows first parents back from `commit` to the nearest merge of an
    /// upstream commit; a commit with no such merge behind it was made
    /// against the upstream head at fork time.
    fn synced_base(
        &self,
        fork: &DocumentRef,
        commit: CommitId,
        upstream: &Upstream,
    ) -> EngineResult<CommitId> {
        let graph = self.graph.read().expect("lock poisoned");
        let mut current = commit;
        loop {
            let node = graph
                .get(fork, &current)
                .ok_or(EngineError::CommitNotFound(current))?;
            if let Some(synced) = node
                .parents
                .iter()
                .find(|p| p.relation == ParentRelation::Merge && p.document == upstream.source)
            {
                return Ok(synced.commit);
            }
            match node.first_parent() {
                Some(parent) => current = parent.commit,
                None => return Ok(upstream.forked_at),
            }
        }
    }

    /// Diff between a pull request's base and its source commit. No side
    /// effects.
    pub fn review_pull_request(&self, id: &PullRequestId) -> EngineResult<DiffResult> {
        let pull_request = self.pull_requests.require(id)?;
        let base = self.content_of(&pull_request.base)?;
        let source = self.content_of(&pull_request.source_commit)?;
        Ok(diff(&base, &source))
    }

    /// Accept or decline a pending pull request.
    ///
    /// Accepting merges into the target first; a conflicting merge leaves
    /// the request pending and fails with `MergeConflict`. Acting on a
    /// resolved request fails with `AlreadyResolved`.
    pub fn action_pull_request(
        &self,
        id: &PullRequestId,
        owner_message: Option<String>,
        decision: Decision,
    ) -> EngineResult<PullRequest> {
        let target = self.pull_requests.require(id)?.target;

        self.locks.with(&target, || -> EngineResult<_> {
            let mut pull_request = self.pull_requests.require(id)?;
            pull_request.ensure_pending()?;
            let actor = pull_request.target.owner.clone();

            match decision {
                Decision::Decline => {
                    let at = self.clock.now();
                    pull_request.decline(owner_message, at)?;
                    self.pull_requests.update(pull_request.clone())?;
                    self.pull_requests.record(
                        id,
                        AuditEntry::new(AuditAction::Declined, actor, at, "declined"),
                    )?;
                    info!(pull_request = %id, "pull request declined");
                }
                Decision::Accept => {
                    let commit = match self.merge_into_upstream(&pull_request) {
                        Ok(commit) => commit,
                        Err(err) => {
                            if let Some(conflicts) = err.conflicts() {
                                self.pull_requests.record(
                                    id,
                                    AuditEntry::new(
                                        AuditAction::AcceptRejected,
                                        actor,
                                        self.clock.now(),
                                        format!("{} conflicting region(s)", conflicts.len()),
                                    ),
                                )?;
                            }
                            return Err(err);
                        }
                    };
                    let at = self.clock.now();
                    pull_request.accept(owner_message, commit, at)?;
                    self.pull_requests.update(pull_request.clone())?;
                    self.pull_requests.record(
                        id,
                        AuditEntry::new(
                            AuditAction::Accepted,
                            actor,
                            at,
                            format!("merged as {}", commit.short_hex()),
                        ),
                    )?;
                    info!(
                        pull_request = %id,
                        target = %target,
                        commit = %commit.short_hex(),
                        "pull request accepted"
                    );
                }
            }
            Ok(pull_request)
        })
    }

    pub fn pull_request(&self, id: &PullRequestId) -> EngineResult<PullRequest> {
        Ok(self.pull_requests.require(id)?)
    }

    /// Pull requests targeting `document`, newest first.
    pub fn pull_requests_for(&self, document: &DocumentRef) -> EngineResult<Vec<PullRequest>> {
        self.registry.require(document)?;
        Ok(self.pull_requests.list_for_target(document)?)
    }

    /// Pull requests opened by `requester`, newest first.
    pub fn pull_requests_by(&self, requester: &UserId) -> EngineResult<Vec<PullRequest>> {
        Ok(self.pull_requests.list_by_requester(requester)?)
    }

    pub fn audit(&self, id: &PullRequestId) -> EngineResult<AuditTrail> {
        Ok(self.pull_requests.audit(id)?)
    }

    // ---- Integrity ----

    /// Check the commit graph, every head, and every stored object.
    pub fn verify(&self) -> EngineResult<VerifyReport> {
        let graph = self.graph.read().expect("lock poisoned");
        graph.validate()?;

        let documents = graph.documents();
        for document in &documents {
            let record = self.registry.require(document)?;
            if !graph.contains(document, &record.head) {
                error!(document = %document, head = %record.head.short_hex(), "head is not in the document's log");
                return Err(EngineError::Corrupted(format!(
                    "head of {document} is not in its log"
                )));
            }
            for node in graph.document_log(document) {
                let header = self.store.get_commit(&node.id.object_id())?;
                self.store.get_content(&header.content)?;
            }
        }

        Ok(VerifyReport {
            documents: documents.len(),
            commits: graph.len(),
            objects: self.store.len(),
        })
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("node_id", &self.config.node_id)
            .field("documents", &self.registry.len())
            .field("objects", &self.store.len())
            .finish()
    }
}
