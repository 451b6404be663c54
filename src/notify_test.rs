use super::*;

#[test]
fn recording_notifier_keeps_order() {
    let rec = RecordingNotifier::new();
    rec.notify(Notification::success("Sent", "ok"));
    rec.notify(Notification::error("Upload failed", "nope"));

    let all = rec.snapshot();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].title, "Sent");
    assert_eq!(all[1].level, NotificationLevel::Error);
    assert_eq!(rec.count(NotificationLevel::Success), 1);
    assert_eq!(rec.count(NotificationLevel::Error), 1);
}

#[test]
fn recording_notifier_drain_empties() {
    let rec = RecordingNotifier::new();
    rec.notify(Notification::success("a", "b"));
    assert_eq!(rec.drain().len(), 1);
    assert!(rec.snapshot().is_empty());
}

#[test]
fn tracing_notifier_accepts_both_levels() {
    TracingNotifier.notify(Notification::success("a", "b"));
    TracingNotifier.notify(Notification::error("a", "b"));
}
