use std::path::PathBuf;

use serde_json::Value;
use dtt::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    let err = Error::InvalidArgument("bad input".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);

    let err = Error::UnknownUser {
        name: "Mallory".to_string(),
        known: "Alice, Bob".to_string(),
    };
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::OperationFailed("boom".to_string());
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);

    let err = Error::Mail("connection refused".to_string());
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn details_include_unknown_user_fields() {
    let err = Error::UnknownUser {
        name: "Mallory".to_string(),
        known: "Alice, Bob".to_string(),
    };
    let details = err.details().expect("details");
    assert_eq!(details["user"], Value::String("Mallory".to_string()));
    assert_eq!(details["known"], serde_json::json!(["Alice", "Bob"]));
}

#[test]
fn json_error_includes_record_location() {
    let err = Error::MalformedRecord {
        path: PathBuf::from("tasks.csv"),
        row: 3,
        message: "invalid date".to_string(),
    };
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::OPERATION_FAILED);
    assert_eq!(json.kind, "operation_failed");
    assert!(json.message.contains("tasks.csv"));
    let details = json.details.expect("details");
    assert_eq!(details["row"], 3);
}

#[test]
fn json_error_omits_missing_details() {
    let err = Error::InvalidConfig("bad config".to_string());
    let value = serde_json::to_value(JsonError::from(&err)).expect("json");
    assert_eq!(value["code"], exit_codes::USER_ERROR);
    assert_eq!(value["kind"], "user_error");
    assert!(value.get("details").is_none());
}
