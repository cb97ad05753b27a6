//! End-to-end collaboration flows through the public `Engine` API.

use std::sync::Arc;
use std::thread;

use quire_sdk::{
    Decision, DocumentName, DocumentRef, Engine, EngineError, ErrorKind, NewDocument,
    PullOutcome, PullRequestStatus, UserId, PULL_REQUEST_SENT,
};

fn user(name: &str) -> UserId {
    UserId::new(name).unwrap()
}

fn create(engine: &Engine, owner: &str, name: &str, content: &str) -> DocumentRef {
    engine
        .create_document(
            NewDocument::new(user(owner), DocumentName::new(name).unwrap()).content(content),
        )
        .unwrap()
        .reference()
}

fn numbered(count: usize) -> String {
    (1..=count).map(|i| format!("line {i}\n")).collect()
}

fn replace_line(text: &str, line: usize, with: &str) -> String {
    text.split_inclusive('\n')
        .enumerate()
        .map(|(i, l)| if i + 1 == line { format!("{with}\n") } else { l.to_string() })
        .collect()
}

#[test]
fn identical_saves_get_distinct_commits() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "same\n");

    let a = engine.commit(&doc, "same\n", &user("sim"), None).unwrap();
    let b = engine.commit(&doc, "same\n", &user("sim"), None).unwrap();

    assert_ne!(a, b);
    let history = engine.history(&doc).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(&history[..2], &[b, a]);
    assert_eq!(engine.get(&a).unwrap(), engine.get(&b).unwrap());
}

#[test]
fn checkout_returns_past_content_without_moving_head() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "first\n");
    let root = engine.document(&doc).unwrap().head;
    let second = engine.commit(&doc, "second\n", &user("sim"), None).unwrap();

    assert_eq!(engine.checkout(&doc, &root).unwrap(), "first\n");
    assert_eq!(engine.document(&doc).unwrap().head, second);
    assert_eq!(engine.open_document(&doc).unwrap().content, "second\n");
}

#[test]
fn save_without_message_is_allowed() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "a\n");
    engine.commit(&doc, "b\n", &user("sim"), None).unwrap();

    let log = engine.log(&doc, 10).unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].message, None);
}

#[test]
fn non_overlapping_upstream_edits_pull_cleanly() {
    let engine = Engine::in_memory();
    let original = numbered(10);
    let doc = create(&engine, "sim", "notes", &original);
    let fork = engine.fork_document(&doc, &user("tim")).unwrap().fork.reference();

    let upstream = replace_line(&replace_line(&original, 1, "LINE ONE"), 2, "LINE TWO");
    engine.commit(&doc, &upstream, &user("sim"), None).unwrap();
    let ours = replace_line(&original, 10, "LINE TEN");
    engine.commit(&fork, &ours, &user("tim"), None).unwrap();

    let review = engine.review_upstream(&fork).unwrap();
    assert_eq!(review.additions(), 2);
    assert_eq!(review.deletions(), 2);

    let outcome = engine.pull_upstream(&fork).unwrap();
    let expected = replace_line(&upstream, 10, "LINE TEN");
    match outcome {
        PullOutcome::Merged { commit, content } => {
            assert_eq!(content, expected);
            assert_eq!(engine.document(&fork).unwrap().head, commit);
        }
        other => panic!("expected a clean merge, got {other:?}"),
    }

    let summary = engine.document(&fork).unwrap();
    let upstream_head = engine.document(&doc).unwrap().head;
    assert_eq!(summary.upstream.unwrap().base, upstream_head);
    assert!(engine.log(&fork, 1).unwrap()[0].is_merge());

    // Pulling again is a no-op.
    assert_eq!(engine.pull_upstream(&fork).unwrap(), PullOutcome::UpToDate);
}

#[test]
fn same_line_edits_conflict_and_leave_fork_untouched() {
    let engine = Engine::in_memory();
    let original = numbered(3);
    let doc = create(&engine, "sim", "notes", &original);
    let fork = engine.fork_document(&doc, &user("tim")).unwrap().fork.reference();

    engine
        .commit(&doc, &replace_line(&original, 2, "upstream"), &user("sim"), None)
        .unwrap();
    let ours = replace_line(&original, 2, "fork");
    let fork_head = engine.commit(&fork, &ours, &user("tim"), None).unwrap();
    let base_before = engine.document(&fork).unwrap().upstream.unwrap().base;

    match engine.pull_upstream(&fork).unwrap() {
        PullOutcome::Conflicted { conflicts, preview } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].fork_text(), "fork\n");
            assert_eq!(conflicts[0].upstream_text(), "upstream\n");
            assert!(preview.contains("<<<<<<<"));
        }
        other => panic!("expected a conflict, got {other:?}"),
    }

    let after = engine.document(&fork).unwrap();
    assert_eq!(after.head, fork_head);
    assert_eq!(after.upstream.unwrap().base, base_before);
    assert_eq!(engine.open_document(&fork).unwrap().content, ours);
}

#[test]
fn pull_request_accept_advances_target() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", &numbered(4));
    let fork = engine.fork_document(&doc, &user("tim")).unwrap().fork.reference();
    let proposal = replace_line(&numbered(4), 3, "improved");
    let commit = engine.commit(&fork, &proposal, &user("tim"), None).unwrap();

    let requested = engine
        .request_merge(&user("tim"), &fork, commit, Some("please merge".into()))
        .unwrap();
    assert_eq!(requested.confirmation, PULL_REQUEST_SENT);
    let id = requested.pull_request.id;

    let review = engine.review_pull_request(&id).unwrap();
    assert_eq!(review.additions(), 1);

    let before = engine.document(&doc).unwrap().head;
    let accepted = engine
        .action_pull_request(&id, Some("thanks".into()), Decision::Accept)
        .unwrap();
    assert_eq!(accepted.status, PullRequestStatus::Accepted);
    assert_eq!(accepted.owner_message.as_deref(), Some("thanks"));

    let target = engine.document(&doc).unwrap();
    assert_ne!(target.head, before);
    assert_eq!(accepted.merge_commit, Some(target.head));
    assert_eq!(engine.open_document(&doc).unwrap().content, proposal);

    let err = engine
        .action_pull_request(&id, None, Decision::Decline)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
}

#[test]
fn pull_request_decline_leaves_target_and_records_audit() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "a\n");
    let fork = engine.fork_document(&doc, &user("tim")).unwrap().fork.reference();
    let commit = engine.commit(&fork, "b\n", &user("tim"), None).unwrap();
    let head = engine.document(&doc).unwrap().head;

    let id = engine
        .request_merge(&user("tim"), &fork, commit, None)
        .unwrap()
        .pull_request
        .id;
    let declined = engine
        .action_pull_request(&id, Some("no".into()), Decision::Decline)
        .unwrap();

    assert_eq!(declined.status, PullRequestStatus::Declined);
    assert_eq!(engine.document(&doc).unwrap().head, head);

    let trail = engine.audit(&id).unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail.actors(), vec![user("sim"), user("tim")]);
    assert_eq!(engine.pull_requests_for(&doc).unwrap().len(), 1);
    assert_eq!(engine.pull_requests_by(&user("tim")).unwrap().len(), 1);
}

#[test]
fn request_from_commit_before_pull_keeps_upstream_edits() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "a\nb\nc\n");
    let fork = engine.fork_document(&doc, &user("tim")).unwrap().fork.reference();
    let proposal = engine.commit(&fork, "a\nb\nC\n", &user("tim"), None).unwrap();

    engine.commit(&doc, "A\nb\nc\n", &user("sim"), None).unwrap();
    assert!(matches!(
        engine.pull_upstream(&fork).unwrap(),
        PullOutcome::Merged { .. }
    ));

    let id = engine
        .request_merge(&user("tim"), &fork, proposal, None)
        .unwrap()
        .pull_request
        .id;
    let review = engine.review_pull_request(&id).unwrap();
    assert_eq!(review.additions(), 1);
    assert_eq!(review.deletions(), 1);

    engine.action_pull_request(&id, None, Decision::Accept).unwrap();
    assert_eq!(engine.open_document(&doc).unwrap().content, "A\nb\nC\n");
}

#[test]
fn request_after_pull_is_based_on_pulled_upstream() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "a\nb\nc\n");
    let fork = engine.fork_document(&doc, &user("tim")).unwrap().fork.reference();
    let upstream_head = engine.commit(&doc, "A\nb\nc\n", &user("sim"), None).unwrap();
    engine.pull_upstream(&fork).unwrap();
    let commit = engine.commit(&fork, "A\nb\nC\n", &user("tim"), None).unwrap();

    let pull_request = engine
        .request_merge(&user("tim"), &fork, commit, None)
        .unwrap()
        .pull_request;
    assert_eq!(pull_request.base, upstream_head);

    let review = engine.review_pull_request(&pull_request.id).unwrap();
    assert_eq!(review.additions(), 1);
    assert_eq!(review.deletions(), 1);
}

#[test]
fn conflicting_accept_keeps_request_pending() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "a\nb\n");
    let fork = engine.fork_document(&doc, &user("tim")).unwrap().fork.reference();
    let commit = engine.commit(&fork, "a\nfork\n", &user("tim"), None).unwrap();
    engine.commit(&doc, "a\nowner\n", &user("sim"), None).unwrap();

    let id = engine
        .request_merge(&user("tim"), &fork, commit, None)
        .unwrap()
        .pull_request
        .id;
    let err = engine
        .action_pull_request(&id, None, Decision::Accept)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.conflicts().map(<[_]>::len), Some(1));
    assert!(engine.pull_request(&id).unwrap().is_pending());
    assert_eq!(engine.audit(&id).unwrap().len(), 2);
}

#[test]
fn fork_appears_in_owner_listing() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "x\n");
    create(&engine, "tim", "diary", "y\n");

    let result = engine.fork_document(&doc, &user("tim")).unwrap();
    let names: Vec<_> = result
        .documents
        .iter()
        .map(|d| d.name.as_str().to_string())
        .collect();
    assert_eq!(names, vec!["diary", "notes"]);
    assert!(result.fork.is_fork());
    assert_eq!(engine.open_document(&result.fork.reference()).unwrap().content, "x\n");
}

#[test]
fn duplicate_documents_are_rejected() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "x\n");

    let err = engine
        .create_document(NewDocument::new(user("sim"), DocumentName::new("notes").unwrap()))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    let err = engine.fork_document(&doc, &user("sim")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);

    engine.fork_document(&doc, &user("tim")).unwrap();
    let err = engine.fork_document(&doc, &user("tim")).unwrap_err();
    assert!(matches!(err, EngineError::DocumentExists(_)));
}

#[test]
fn upstream_operations_require_a_fork() {
    let engine = Engine::in_memory();
    let doc = create(&engine, "sim", "notes", "x\n");
    let head = engine.document(&doc).unwrap().head;

    assert!(matches!(
        engine.review_upstream(&doc).unwrap_err(),
        EngineError::NotAFork(_)
    ));
    assert!(matches!(
        engine.request_merge(&user("sim"), &doc, head, None).unwrap_err(),
        EngineError::NotAFork(_)
    ));
}

#[test]
fn concurrent_saves_are_serialized() {
    let engine = Arc::new(Engine::in_memory());
    let doc = create(&engine, "sim", "notes", "start\n");

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let doc = doc.clone();
            thread::spawn(move || {
                for j in 0..5 {
                    engine
                        .commit(&doc, &format!("{i}-{j}\n"), &user("sim"), None)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(engine.history(&doc).unwrap().len(), 41);
    let report = engine.verify().unwrap();
    assert_eq!(report.commits, 41);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn every_save_is_recoverable(contents in prop::collection::vec("[a-c\n]{0,12}", 1..8)) {
            let engine = Engine::in_memory();
            let doc = create(&engine, "sim", "notes", "");

            let ids: Vec<_> = contents
                .iter()
                .map(|text| engine.commit(&doc, text, &user("sim"), None).unwrap())
                .collect();

            prop_assert_eq!(engine.history(&doc).unwrap().len(), contents.len() + 1);
            for (id, text) in ids.iter().zip(&contents) {
                prop_assert_eq!(&engine.checkout(&doc, id).unwrap(), text);
            }
            prop_assert_eq!(engine.document(&doc).unwrap().head, *ids.last().unwrap());
        }
    }
}
