// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use pitscout_sync::error::AppError;
use pitscout_sync::models::MatchRecordDraft;
use validator::Validate;

#[test]
fn test_is_connectivity_error_matches() {
    assert!(AppError::Offline.is_connectivity_error());

    let err = AppError::Database(AppError::DATABASE_OFFLINE.to_string());
    assert!(err.is_connectivity_error());
}

#[test]
fn test_is_connectivity_error_no_match() {
    let err = AppError::Database("PERMISSION_DENIED".to_string());
    assert!(!err.is_connectivity_error());

    let err = AppError::AssetStorage("HTTP 403".to_string());
    assert!(!err.is_connectivity_error());

    assert!(!AppError::Unauthorized.is_connectivity_error());
}

#[test]
fn test_validation_errors_become_bad_request() {
    let draft = MatchRecordDraft {
        team_number: 0,
        match_number: 1,
        ..Default::default()
    };
    let err: AppError = draft.validate().unwrap_err().into();

    match err {
        AppError::BadRequest(msg) => assert!(msg.contains("team_number")),
        other => panic!("expected bad request, got {:?}", other),
    }
}
