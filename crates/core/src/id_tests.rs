// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn id_buf_round_trips_through_str() {
    let buf = IdBuf::new("sess-abc123");
    assert_eq!(buf.as_str(), "sess-abc123");
    assert!(!buf.is_empty());
}

#[test]
fn id_buf_empty_is_empty() {
    assert!(IdBuf::empty().is_empty());
}

#[test]
fn session_token_has_expected_prefix() {
    let token = SessionToken::new();
    assert!(token.as_str().starts_with("sess"));
    assert_eq!(token.as_str().len(), ID_MAX_LEN);
}

#[test]
fn session_token_from_string_round_trips() {
    let token = SessionToken::from_string("sess1234567890123456789");
    assert_eq!(token.as_str(), "sess1234567890123456789");
}

#[test]
fn id_buf_serde_round_trips() {
    let buf = IdBuf::new("sess-xyz");
    let json = serde_json::to_string(&buf).unwrap();
    let back: IdBuf = serde_json::from_str(&json).unwrap();
    assert_eq!(buf, back);
}
