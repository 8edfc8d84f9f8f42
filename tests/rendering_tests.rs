use std::collections::HashMap;

use oncall_slack::core::models::{AlertState, AlertUser, ScheduleOnCallUsers};
use oncall_slack::slack::MessageTarget;
use oncall_slack::slack::message::{
    self, COLOR_ACKED, COLOR_CLOSED, COLOR_UNACKED, escape_message, format_personnel,
};

/// Tests for the pure message rendering functions.

fn user(id: &str, name: &str, url: &str) -> AlertUser {
    AlertUser {
        id: id.to_string(),
        name: name.to_string(),
        url: url.to_string(),
    }
}

fn links(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn test_personnel_list_formatting() {
    assert_eq!(format_personnel(&links(&[])), "None");
    assert_eq!(format_personnel(&links(&["A"])), "A");
    assert_eq!(format_personnel(&links(&["A", "B"])), "A and B");
    assert_eq!(format_personnel(&links(&["A", "B", "C"])), "A, B, and C");
}

#[test]
fn test_personnel_list_four_entries() {
    assert_eq!(
        format_personnel(&links(&["A", "B", "C", "D"])),
        "A, B, C, and D"
    );
}

#[test]
fn test_escape_message() {
    assert_eq!(escape_message("a & b < c > d"), "a &amp; b &lt; c &gt; d");
    assert_eq!(escape_message("plain"), "plain");
}

#[test]
fn test_user_links_mention_and_fallback() {
    let users = vec![
        user("u1", "Alice", "https://alerts.example.com/users/u1"),
        user("u2", "Bob", "https://alerts.example.com/users/u2"),
    ];
    let mut subject_ids = HashMap::new();
    subject_ids.insert("u1".to_string(), "UAAA111".to_string());

    let rendered = message::user_links(&users, &subject_ids);
    assert_eq!(rendered[0], "<@UAAA111>");
    assert_eq!(rendered[1], "<https://alerts.example.com/users/u2|Bob>");
}

#[test]
fn test_user_links_escapes_fallback_fields() {
    let users = vec![user("u1", "A <b>", "https://alerts.example.com/u?x=1&y=2")];
    let rendered = message::user_links(&users, &HashMap::new());
    assert_eq!(
        rendered[0],
        "<https://alerts.example.com/u?x=1&amp;y=2|A &lt;b&gt;>"
    );
}

#[test]
fn test_alert_link_text() {
    let text = message::alert_link_text(
        "https://alerts.example.com/alerts/42",
        42,
        "CPU > 90%",
        &links(&["<@UAAA111>"]),
    );

    assert!(text.contains("<https://alerts.example.com/alerts/42|Alert #42: CPU &gt; 90%>"));
    assert!(text.contains("Personnel: <@UAAA111>"));
}

#[test]
fn test_new_alert_message_blocks() {
    let payload = message::alert_message(
        MessageTarget::New,
        "<https://alerts.example.com/alerts/42|Alert #42: disk full>\nPersonnel: None",
        42,
        "disk full",
        "90% used on /var",
        "Unacknowledged",
        AlertState::Unacknowledged,
        false,
    );

    assert_eq!(payload.target, MessageTarget::New);
    assert!(payload.text.is_none());

    let attachment = payload.attachment.expect("alert messages carry an attachment");
    assert_eq!(attachment.color, COLOR_UNACKED);
    assert_eq!(attachment.fallback, "Alert #42: disk full");
    assert_eq!(attachment.blocks.len(), 3, "link + details + footer");

    let details = attachment.blocks[1]["text"]["text"].as_str().unwrap();
    assert!(details.contains("90% used on /var"));

    let footer = attachment.blocks[2]["elements"][0]["text"].as_str().unwrap();
    assert_eq!(footer, "Unacknowledged");
}

#[test]
fn test_closed_alert_suppresses_details() {
    let payload = message::alert_message(
        MessageTarget::Update("1111.2222".to_string()),
        "link",
        42,
        "disk full",
        "these details must not render",
        "Closed",
        AlertState::Closed,
        false,
    );

    let attachment = payload.attachment.unwrap();
    assert_eq!(attachment.color, COLOR_CLOSED);
    assert_eq!(attachment.blocks.len(), 2, "link + footer only when closed");
}

#[test]
fn test_acknowledged_alert_color() {
    let payload = message::alert_message(
        MessageTarget::Update("1111.2222".to_string()),
        "link",
        42,
        "disk full",
        "",
        "Acknowledged by Alice",
        AlertState::Acknowledged,
        false,
    );

    let attachment = payload.attachment.unwrap();
    assert_eq!(attachment.color, COLOR_ACKED);
    let footer = attachment.blocks[1]["elements"][0]["text"].as_str().unwrap();
    assert_eq!(footer, "Acknowledged by Alice");
}

#[test]
fn test_alert_details_are_truncated_to_budget() {
    let long_details = "x".repeat(10_000);
    let payload = message::alert_message(
        MessageTarget::New,
        "link",
        42,
        "disk full",
        &long_details,
        "Unacknowledged",
        AlertState::Unacknowledged,
        false,
    );

    let attachment = payload.attachment.unwrap();
    let details = attachment.blocks[1]["text"]["text"].as_str().unwrap();
    assert!(details.len() <= 3000, "details must fit the byte budget");
    assert!(details.starts_with("xxx"), "leading content is preserved");
}

#[test]
fn test_empty_details_render_no_details_block() {
    let payload = message::alert_message(
        MessageTarget::New,
        "link",
        42,
        "disk full",
        "",
        "Unacknowledged",
        AlertState::Unacknowledged,
        false,
    );

    assert_eq!(payload.attachment.unwrap().blocks.len(), 2);
}

#[test]
fn test_bundle_text() {
    let text = message::bundle_text(
        "Payments & Billing",
        3,
        "https://alerts.example.com/services/svc1/alerts",
    );

    assert_eq!(
        text,
        "Service 'Payments &amp; Billing' has 3 unacknowledged alerts.\n\n<https://alerts.example.com/services/svc1/alerts>"
    );
}

fn on_call(users: Vec<AlertUser>) -> ScheduleOnCallUsers {
    ScheduleOnCallUsers {
        channel_id: "C1".to_string(),
        schedule_id: "sched1".to_string(),
        schedule_name: "Primary".to_string(),
        schedule_url: "https://alerts.example.com/schedules/sched1".to_string(),
        users,
    }
}

#[test]
fn test_on_call_text_with_mapped_and_unmapped_users() {
    let msg = on_call(vec![
        user("u1", "Alice", "https://alerts.example.com/users/u1"),
        user("u2", "Bob", "https://alerts.example.com/users/u2"),
    ]);
    let mut subject_ids = HashMap::new();
    subject_ids.insert("u1".to_string(), "UAAA111".to_string());

    let text = message::on_call_text(&msg, &subject_ids);
    assert!(text.contains("Personnel: <@UAAA111> and <https://alerts.example.com/users/u2|Bob>"));
    assert!(text.contains("Schedule: <https://alerts.example.com/schedules/sched1|Primary>"));
    assert!(text.contains("Please ACKNOWLEDGE and CLOSE any triggered alerts ASAP!"));
}

#[test]
fn test_on_call_text_degrades_to_fallback_links() {
    let msg = on_call(vec![
        user("u1", "Alice", "https://alerts.example.com/users/u1"),
        user("u2", "Bob", "https://alerts.example.com/users/u2"),
    ]);

    let text = message::on_call_text(&msg, &HashMap::new());
    assert!(!text.contains("<@"), "no mentions without a subject mapping");
    assert!(text.contains("<https://alerts.example.com/users/u1|Alice>"));
    assert!(text.contains("<https://alerts.example.com/users/u2|Bob>"));
}

#[test]
fn test_on_call_text_without_users() {
    let text = message::on_call_text(&on_call(vec![]), &HashMap::new());
    assert!(text.contains("Personnel: None"));
}
