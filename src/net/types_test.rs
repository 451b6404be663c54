use super::*;

// =============================================================================
// upload allow-list
// =============================================================================

#[test]
fn allowed_mime_types_are_exact() {
    assert!(is_allowed_upload_mime("application/pdf"));
    assert!(is_allowed_upload_mime("application/vnd.ms-powerpoint"));
    assert!(is_allowed_upload_mime(
        "application/vnd.openxmlformats-officedocument.presentationml.presentation"
    ));
    assert!(is_allowed_upload_mime(
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    ));
}

#[test]
fn disallowed_mime_types_rejected() {
    assert!(!is_allowed_upload_mime("text/plain"));
    assert!(!is_allowed_upload_mime("application/msword"));
    assert!(!is_allowed_upload_mime("APPLICATION/PDF"));
    assert!(!is_allowed_upload_mime(""));
}

#[test]
fn mime_for_file_name_maps_known_extensions() {
    assert_eq!(mime_for_file_name("deck.PPTX"), MIME_PPTX);
    assert_eq!(mime_for_file_name("notes.docx"), MIME_DOCX);
    assert_eq!(mime_for_file_name("paper.pdf"), MIME_PDF);
    assert_eq!(mime_for_file_name("old.ppt"), MIME_PPT);
    assert_eq!(mime_for_file_name("readme.txt"), "text/plain");
    assert_eq!(mime_for_file_name("no_extension"), "application/octet-stream");
}

// =============================================================================
// serde shapes
// =============================================================================

#[test]
fn message_deserializes_camel_case() {
    let raw = r#"{"id":7,"content":"hi","isBot":true,"sessionId":"s1","timestamp":"2024-01-01T00:00:00Z"}"#;
    let msg: Message = serde_json::from_str(raw).unwrap();
    assert_eq!(msg.id, 7);
    assert!(msg.is_bot);
    assert_eq!(msg.session_id, "s1");
    assert_eq!(msg.timestamp.as_deref(), Some("2024-01-01T00:00:00Z"));
}

#[test]
fn message_timestamp_optional() {
    let raw = r#"{"id":1,"content":"x","isBot":false,"sessionId":"s"}"#;
    let msg: Message = serde_json::from_str(raw).unwrap();
    assert!(msg.timestamp.is_none());
}

#[test]
fn send_request_serializes_is_bot_false() {
    let body = serde_json::to_value(SendMessageRequest::user("hello", "abc")).unwrap();
    assert_eq!(body, serde_json::json!({ "content": "hello", "sessionId": "abc", "isBot": false }));
}

// =============================================================================
// errors
// =============================================================================

#[test]
fn chat_error_user_messages() {
    assert_eq!(ChatError::Fetch(TransportError::Request("x".into())).user_message(), "Failed to fetch messages.");
    assert_eq!(
        ChatError::Upload(UploadError::UnsupportedType { mime: "text/plain".into() }).user_message(),
        "Please upload a PDF, PowerPoint, or Word document."
    );
}

#[test]
fn busy_error_names_operation() {
    assert_eq!(ChatError::Busy(OperationKind::Upload).to_string(), "a upload request is already in flight");
    assert_eq!(ChatError::Busy(OperationKind::Send).to_string(), "a send request is already in flight");
}

#[test]
fn upload_error_from_transport() {
    let err: UploadError = TransportError::Status { status: 500, body: String::new() }.into();
    assert_eq!(err.to_string(), "upload failed: server responded with status 500");
}
