//! Unit tests for API types serialization/deserialization.

#![allow(clippy::unwrap_used, clippy::panic)]

use chrono::NaiveDate;
use microfin::api::{
    AccessRequest, AccessResponse, HealthResponse, MenuRequest, PageResponse, ParseRequest,
    ParseResponse,
};
use microfin_core::{
    BirthRecord, Gender, IdentityFormat, PageAccess, RawRequirement, RawSession,
};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_serialization() {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: "0.4.2".to_string(),
    };

    let json = serde_json::to_string(&health).unwrap();
    assert!(json.contains("\"status\":\"ok\""));
    assert!(json.contains("\"version\":\"0.4.2\""));
}

// =============================================================================
// IDENTITY TYPES
// =============================================================================

#[test]
fn test_parse_request_today_optional() {
    let request: ParseRequest = serde_json::from_str(r#"{"nic":"850234567V"}"#).unwrap();
    assert_eq!(request.nic, "850234567V");
    assert!(request.today.is_none());

    let request: ParseRequest =
        serde_json::from_str(r#"{"nic":"850234567V","today":"2026-10-16"}"#).unwrap();
    assert_eq!(request.today, NaiveDate::from_ymd_opt(2026, 10, 16));
}

#[test]
fn test_parse_request_rejects_bad_date() {
    let result = serde_json::from_str::<ParseRequest>(r#"{"nic":"x","today":"16/10/2026"}"#);
    assert!(result.is_err());
}

#[test]
fn test_parse_response_success_shape() {
    let record = BirthRecord {
        date_of_birth: NaiveDate::from_ymd_opt(1985, 1, 23).unwrap(),
        gender: Gender::Male,
        age: 41,
        day_of_year: 23,
        format: IdentityFormat::Legacy { voter: true },
    };

    let value = serde_json::to_value(ParseResponse::success(record)).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["record"]["date_of_birth"], "1985-01-23");
    assert_eq!(value["record"]["gender"], "Male");
    assert_eq!(value["record"]["format"]["kind"], "legacy");
    assert_eq!(value["record"]["format"]["voter"], true);
    assert!(value["error"].is_null());
}

#[test]
fn test_parse_response_error_shape() {
    let response = ParseResponse::error("Unrecognized identity number format");
    assert!(!response.success);
    assert!(response.record.is_none());
    assert_eq!(
        response.error.as_deref(),
        Some("Unrecognized identity number format")
    );
}

// =============================================================================
// ACCESS TYPES
// =============================================================================

#[test]
fn test_access_request_flattens_requirement() {
    let json = r#"{
        "session": {"role": "manager", "permissions": ["loans.view"]},
        "permission": "loans.view",
        "roles": ["manager", "admin"]
    }"#;

    let request: AccessRequest = serde_json::from_str(json).unwrap();

    assert_eq!(
        request.session,
        Some(RawSession {
            role: Some("manager".to_string()),
            permissions: vec!["loans.view".to_string()],
        })
    );
    assert_eq!(
        request.requirement,
        RawRequirement {
            permission: Some("loans.view".to_string()),
            roles: Some(vec!["manager".to_string(), "admin".to_string()]),
        }
    );
}

#[test]
fn test_access_request_empty_body() {
    let request: AccessRequest = serde_json::from_str("{}").unwrap();
    assert!(request.session.is_none());
    assert_eq!(request.requirement, RawRequirement::default());
}

#[test]
fn test_session_without_permissions_field() {
    let request: MenuRequest = serde_json::from_str(r#"{"session":{"role":"staff"}}"#).unwrap();
    let session = request.session.unwrap();
    assert_eq!(session.role.as_deref(), Some("staff"));
    assert!(session.permissions.is_empty());
}

#[test]
fn test_access_response_unknown_keys_default() {
    let response: AccessResponse = serde_json::from_str(r#"{"allowed":true}"#).unwrap();
    assert!(response.allowed);
    assert!(response.unknown_keys.is_empty());
}

#[test]
fn test_page_response_from_outcome() {
    let granted = PageResponse::new(PageAccess::Granted, vec![]);
    let json = serde_json::to_string(&granted).unwrap();
    assert!(json.contains("\"access\":\"granted\""));
    assert!(!json.contains("redirect"));

    let redirect = PageResponse::new(PageAccess::Redirect("/".to_string()), vec!["x".into()]);
    assert_eq!(redirect.access, "redirect");
    assert_eq!(redirect.redirect.as_deref(), Some("/"));
    assert_eq!(redirect.unknown_keys, vec!["x".to_string()]);

    assert_eq!(PageResponse::new(PageAccess::Pending, vec![]).access, "pending");
}
