//! Store-level tests exercising the Database directly.

use std::path::PathBuf;

use cadence_core::{
    Database, EmailStatus, StageStatus, StageType, TimelineError, UpdateStageRequest,
};
use jiff::Timestamp;
use tempfile::TempDir;

fn create_test_database() -> (TempDir, Database) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path: PathBuf = temp_dir.path().join("test_store.db");
    let db = Database::new(&db_path).expect("Failed to create database");
    (temp_dir, db)
}

fn seed_connection(db: &mut Database) -> u64 {
    db.insert_connection("test-user", EmailStatus::NotContacted, None, None, None, None)
        .expect("Failed to insert connection")
        .id
}

#[test]
fn test_initial_timeline_invariants() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);

    let stage = db
        .create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");

    assert_eq!(stage.stage_order, 1);
    assert_eq!(stage.stage_type, StageType::FirstImpression);
    assert_eq!(stage.stage_status, StageStatus::Waiting);
    assert_eq!(stage.connection_id, connection_id);

    let timeline = db.get_timeline(connection_id).expect("Failed to get timeline");
    assert_eq!(timeline.stages.len(), 1);

    let settings = timeline.settings.expect("Settings row should exist");
    assert_eq!(settings.follow_up_wait_days, 7);
}

#[test]
fn test_initial_timeline_requires_connection() {
    let (_temp_dir, mut db) = create_test_database();

    match db.create_initial_timeline(42).unwrap_err() {
        TimelineError::ConnectionNotFound { id } => assert_eq!(id, 42),
        other => panic!("Expected ConnectionNotFound, got {other:?}"),
    }
}

#[test]
fn test_initial_timeline_rejects_reinitialization() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);

    db.create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");

    match db.create_initial_timeline(connection_id).unwrap_err() {
        TimelineError::InvalidInput { field, reason } => {
            assert_eq!(field, "connection_id");
            assert!(reason.contains("already initialized"));
        }
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_get_timeline_missing_connection() {
    let (_temp_dir, db) = create_test_database();

    assert!(matches!(
        db.get_timeline(999).unwrap_err(),
        TimelineError::ConnectionNotFound { id: 999 }
    ));
}

#[test]
fn test_update_stage_empty_field_set() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);
    let stage = db
        .create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");

    let err = db
        .update_stage(connection_id, stage.id, UpdateStageRequest::default())
        .unwrap_err();

    match err {
        TimelineError::InvalidInput { reason, .. } => {
            assert_eq!(reason, "No valid fields to update");
        }
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_update_stage_not_found() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);
    db.create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");

    let request = UpdateStageRequest {
        draft_content: Some("hello".to_string()),
        ..Default::default()
    };

    let err = db.update_stage(connection_id, 999, request).unwrap_err();
    assert!(matches!(err, TimelineError::StageNotFound { id: 999 }));
    assert!(err.to_string().contains("not found or access denied"));
}

#[test]
fn test_update_stage_scoped_to_owning_connection() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_a = seed_connection(&mut db);
    let connection_b = seed_connection(&mut db);
    let stage_a = db
        .create_initial_timeline(connection_a)
        .expect("Failed to create initial timeline");

    // Addressing connection A's stage through connection B is denied.
    let request = UpdateStageRequest {
        draft_content: Some("hijack".to_string()),
        ..Default::default()
    };
    let err = db.update_stage(connection_b, stage_a.id, request).unwrap_err();
    assert!(matches!(err, TimelineError::StageNotFound { .. }));
}

#[test]
fn test_update_stage_merges_fields() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);
    let stage = db
        .create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");

    let updated = db
        .update_stage(
            connection_id,
            stage.id,
            UpdateStageRequest {
                stage_status: Some(StageStatus::Draft),
                draft_content: Some("Dear Sam,".to_string()),
                ..Default::default()
            },
        )
        .expect("Failed to update stage");

    assert_eq!(updated.stage_status, StageStatus::Draft);
    assert_eq!(updated.draft_content.as_deref(), Some("Dear Sam,"));
    // Untouched fields survive the merge.
    assert_eq!(updated.stage_order, 1);
    assert_eq!(updated.email_content, None);

    // A later partial update keeps the earlier draft.
    let updated = db
        .update_stage(
            connection_id,
            stage.id,
            UpdateStageRequest {
                email_content: Some("Dear Sam, final.".to_string()),
                ..Default::default()
            },
        )
        .expect("Failed to update stage");
    assert_eq!(updated.draft_content.as_deref(), Some("Dear Sam,"));
    assert_eq!(updated.email_content.as_deref(), Some("Dear Sam, final."));
}

#[test]
fn test_create_next_stage_orders_and_ownership() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);
    let first = db
        .create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");

    let second = db
        .create_next_stage(connection_id, first.id, StageType::Response)
        .expect("Failed to create next stage");
    assert_eq!(second.stage_order, 2);
    assert_eq!(second.stage_status, StageStatus::Waiting);

    let third = db
        .create_next_stage(connection_id, second.id, StageType::FollowUp)
        .expect("Failed to create next stage");
    assert_eq!(third.stage_order, 3);

    // Advancing from a stage that is not ours fails.
    let other_connection = seed_connection(&mut db);
    let err = db
        .create_next_stage(other_connection, first.id, StageType::FollowUp)
        .unwrap_err();
    assert!(matches!(err, TimelineError::StageNotFound { .. }));
}

#[test]
fn test_expired_response_stages_filters_by_deadline() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);
    let first = db
        .create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");
    let response = db
        .create_next_stage(connection_id, first.id, StageType::Response)
        .expect("Failed to create response stage");

    let now = Timestamp::now();

    // Future deadline: not expired.
    db.update_stage(
        connection_id,
        response.id,
        UpdateStageRequest {
            response_deadline: Some(now + jiff::SignedDuration::from_hours(72)),
            ..Default::default()
        },
    )
    .expect("Failed to set deadline");
    assert!(db.expired_response_stages(now).unwrap().is_empty());

    // Past deadline: expired.
    db.update_stage(
        connection_id,
        response.id,
        UpdateStageRequest {
            response_deadline: Some(now - jiff::SignedDuration::from_secs(60)),
            ..Default::default()
        },
    )
    .expect("Failed to set deadline");
    let expired = db.expired_response_stages(now).unwrap();
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].stage_id, response.id);
    assert_eq!(expired[0].connection_id, connection_id);
    assert_eq!(expired[0].user_id, "test-user");

    // A received response stage is no longer a candidate.
    db.update_stage(
        connection_id,
        response.id,
        UpdateStageRequest {
            stage_status: Some(StageStatus::Received),
            ..Default::default()
        },
    )
    .expect("Failed to update status");
    assert!(db.expired_response_stages(now).unwrap().is_empty());
}

#[test]
fn test_create_stage_at_raw_order() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);
    db.create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");

    let stage = db
        .create_stage(connection_id, StageType::Response, 2, StageStatus::Draft)
        .expect("Failed to create stage");
    assert_eq!(stage.stage_order, 2);
    assert_eq!(stage.stage_status, StageStatus::Draft);

    // The caller-supplied order is still bound by the uniqueness
    // constraint.
    assert!(db
        .create_stage(connection_id, StageType::FollowUp, 2, StageStatus::Waiting)
        .is_err());
}

#[test]
fn test_status_transition_persists() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);
    let stage = db
        .create_initial_timeline(connection_id)
        .expect("Failed to create initial timeline");

    let update = db
        .apply_status_transition(
            connection_id,
            stage.id,
            StageStatus::Sent,
            None,
            Some("final body".to_string()),
        )
        .expect("Failed to apply transition");

    // The returned struct matches what was written.
    let persisted = db
        .get_stage(connection_id, stage.id)
        .expect("Failed to get stage")
        .expect("Stage should exist");
    assert_eq!(persisted.stage_status, StageStatus::Sent);
    assert_eq!(persisted.sent_at, update.stage.sent_at);
    assert_eq!(persisted.response_deadline, update.stage.response_deadline);
    assert_eq!(persisted.email_content.as_deref(), Some("final body"));

    let spawned = update.spawned.expect("Response stage should be spawned");
    let persisted_spawn = db
        .get_stage(connection_id, spawned.id)
        .expect("Failed to get stage")
        .expect("Spawned stage should exist");
    assert_eq!(persisted_spawn.stage_type, StageType::Response);
    assert_eq!(persisted_spawn.stage_order, 2);
}

#[test]
fn test_settings_upsert() {
    let (_temp_dir, mut db) = create_test_database();
    let connection_id = seed_connection(&mut db);

    // Updatable independently of timeline initialization.
    let settings = db
        .update_settings(connection_id, 14)
        .expect("Failed to update settings");
    assert_eq!(settings.follow_up_wait_days, 14);

    let settings = db
        .update_settings(connection_id, 3)
        .expect("Failed to update settings");
    assert_eq!(settings.follow_up_wait_days, 3);

    assert!(matches!(
        db.update_settings(999, 7).unwrap_err(),
        TimelineError::ConnectionNotFound { id: 999 }
    ));
}
