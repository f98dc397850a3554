use pastoral_core::{Case, CaseStatus, Document, DueDate, ReasonCode, TimelineEntryKind};
use serde_json::json;

fn stored_case() -> serde_json::Value {
    json!({
        "id": "case-1",
        "studentId": "stu-1",
        "advisorId": "adv-lee",
        "ownerId": "coord-tricia",
        "status": "open",
        "reasons": ["missed_submission", "wellbeing_flag"],
        "overview": "Missed two deadlines",
        "emailAlias": "case-1@care.example",
        "nextActionDue": "2024-05-20",
        "followUpDate": null,
        "timeline": [{
            "id": "tl-1",
            "type": "email_out",
            "timestamp": "2024-05-01T09:00:00Z",
            "authorId": "adv-lee",
            "summary": "Sent check-in email"
        }]
    })
}

#[test]
fn stored_case_decodes_with_typed_fields() {
    let case: Case = serde_json::from_value(stored_case()).unwrap();

    assert_eq!(case.status, CaseStatus::Open);
    assert_eq!(case.reasons[0], ReasonCode::MissedSubmission);
    assert_eq!(
        case.reasons[1],
        ReasonCode::Unrecognized("wellbeing_flag".to_string())
    );
    assert_eq!(case.next_action_due, Some(DueDate::parse("2024-05-20").unwrap()));
    assert_eq!(case.follow_up_date, None);
    assert_eq!(case.timeline[0].kind, TimelineEntryKind::EmailOut);
}

#[test]
fn case_encodes_back_to_camel_case_wire_names() {
    let case: Case = serde_json::from_value(stored_case()).unwrap();
    let json = serde_json::to_value(&case).unwrap();

    assert_eq!(json["studentId"], "stu-1");
    assert_eq!(json["nextActionDue"], "2024-05-20");
    assert!(json["followUpDate"].is_null());
    assert_eq!(json["reasons"][1], "wellbeing_flag");
    assert_eq!(json["timeline"][0]["type"], "email_out");
    assert_eq!(json["timeline"][0]["authorId"], "adv-lee");
}

#[test]
fn document_without_revision_or_optional_lists_loads_empty() {
    let doc: Document = serde_json::from_value(json!({
        "students": [],
        "users": [],
        "cases": [stored_case()]
    }))
    .unwrap();

    assert_eq!(doc.revision, 0);
    assert!(doc.intake_queue.is_empty());
    assert!(doc.email_inbox.is_empty());
    assert!(doc.find_case("case-1").is_some());
    assert!(doc.find_case("case-404").is_none());
}

#[test]
fn unknown_timeline_kind_is_rejected_as_corrupt() {
    let mut value = stored_case();
    value["timeline"][0]["type"] = json!("fax");
    assert!(serde_json::from_value::<Case>(value).is_err());
}

#[test]
fn close_clears_both_due_fields_and_reports_first_transition() {
    let mut case: Case = serde_json::from_value(stored_case()).unwrap();
    case.reschedule(DueDate::parse("2024-06-01").unwrap());

    assert!(case.close());
    assert_eq!(case.status, CaseStatus::Closed);
    assert_eq!(case.next_action_due, None);
    assert_eq!(case.follow_up_date, None);
    assert!(!case.close());
}
