use chrono::{Days, Duration, Local, NaiveDate, TimeZone, Utc};
use pastoral_core::{
    decorate, decorate_all, filter, project, Case, CaseStatus, Document, DueDate, QueueFilter,
    TimelineEntry, TimelineEntryKind, User,
};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn case_due(id: &str, due: Option<DueDate>) -> Case {
    Case {
        id: id.to_string(),
        student_id: "stu-1".to_string(),
        advisor_id: "adv-lee".to_string(),
        owner_id: "coord-tricia".to_string(),
        status: CaseStatus::Open,
        reasons: Vec::new(),
        overview: String::new(),
        email_alias: format!("{id}@care.example"),
        next_action_due: due,
        follow_up_date: None,
        timeline: Vec::new(),
    }
}

fn mixed_document() -> Document {
    let mut cases = Vec::new();
    for offset in -3_i64..=3 {
        let day = if offset < 0 {
            today().checked_sub_days(Days::new(offset.unsigned_abs()))
        } else {
            today().checked_add_days(Days::new(offset.unsigned_abs()))
        }
        .unwrap();
        cases.push(case_due(&format!("day{offset}"), Some(DueDate::day(day))));
        let noon = day.and_hms_opt(12, 0, 0).unwrap();
        cases.push(case_due(&format!("local{offset}"), Some(DueDate::local(noon))));
    }
    cases.push(case_due("unset-a", None));
    cases.push(case_due("unset-b", None));
    Document {
        cases,
        ..Document::default()
    }
}

#[test]
fn project_orders_ascending_with_unset_last_in_input_order() {
    let doc = mixed_document();
    let queue = project(&decorate_all(&doc.cases, &doc));

    for pair in queue.windows(2) {
        match (&pair[0].next_action_due, &pair[1].next_action_due) {
            (Some(a), Some(b)) => assert!(a.local_naive() <= b.local_naive()),
            (None, Some(_)) => panic!("unset due date sorted before a set one"),
            _ => {}
        }
    }
    let tail: Vec<&str> = queue[queue.len() - 2..].iter().map(|i| i.id.as_str()).collect();
    assert_eq!(tail, vec!["unset-a", "unset-b"]);
}

#[test]
fn today_is_subset_of_all_and_disjoint_from_overdue() {
    let doc = mixed_document();
    let queue = project(&decorate_all(&doc.cases, &doc));

    let all = filter(&queue, QueueFilter::All, today());
    let due_today = filter(&queue, QueueFilter::Today, today());
    let overdue = filter(&queue, QueueFilter::Overdue, today());

    assert_eq!(all, queue);
    assert!(due_today.iter().all(|item| all.contains(item)));
    assert!(due_today.iter().all(|item| !overdue.contains(item)));

    let today_ids: Vec<&str> = due_today.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(today_ids, vec!["day0", "local0"]);
    assert_eq!(overdue.len(), 6);
    assert!(overdue.iter().all(|item| item.next_action_due.is_some()));
}

#[test]
fn filter_preserves_relative_order_and_leaves_queue_untouched() {
    let doc = mixed_document();
    let queue = project(&decorate_all(&doc.cases, &doc));
    let snapshot = queue.clone();

    let overdue = filter(&queue, QueueFilter::Overdue, today());
    let positions: Vec<usize> = overdue
        .iter()
        .map(|item| queue.iter().position(|q| q.id == item.id).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(queue, snapshot);
}

#[test]
fn decorated_timeline_is_non_increasing_for_any_storage_order() {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let offsets = [5_i64, 1, 9, 3, 3, 0, 7];
    let mut case = case_due("case-t", None);
    case.timeline = offsets
        .iter()
        .enumerate()
        .map(|(index, hours)| TimelineEntry {
            id: format!("tl-{index}"),
            kind: TimelineEntryKind::Meeting,
            timestamp: base + Duration::hours(*hours),
            author_id: "adv-lee".to_string(),
            summary: String::new(),
        })
        .collect();
    let doc = Document {
        users: vec![User {
            id: "adv-lee".to_string(),
            name: "Dr Sam Lee".to_string(),
            email: String::new(),
            role: "advisor".to_string(),
        }],
        cases: vec![case],
        ..Document::default()
    };

    let view = decorate(&doc.cases[0], &doc);
    assert!(view
        .timeline
        .windows(2)
        .all(|w| w[0].timestamp >= w[1].timestamp));
    assert_eq!(view.timeline.len(), offsets.len());
    // equal timestamps keep storage order
    let tied: Vec<&str> = view
        .timeline
        .iter()
        .filter(|e| e.timestamp == base + Duration::hours(3))
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(tied, vec!["tl-3", "tl-4"]);
}

#[test]
fn decorate_is_idempotent() {
    let doc = mixed_document();
    let first = decorate(&doc.cases[0], &doc);
    let second = decorate(&doc.cases[0], &doc);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
