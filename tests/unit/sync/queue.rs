use super::*;

fn apply(c: &str) -> SyncTask {
    SyncTask::Apply(c.to_string())
}

#[test]
fn duplicate_applies_collapse() {
    let out = coalesce([apply("Main"), apply("Vertical"), apply("Main")]);
    assert_eq!(out, vec![apply("Main"), apply("Vertical")]);
}

#[test]
fn apply_all_subsumes_single_canvas_applies() {
    let out = coalesce([apply("Main"), SyncTask::ApplyAll, apply("Vertical")]);
    assert_eq!(out, vec![SyncTask::ApplyAll]);
}

#[test]
fn clear_all_discards_earlier_work() {
    let out = coalesce([apply("Main"), SyncTask::ApplyAll, SyncTask::ClearAll]);
    assert_eq!(out, vec![SyncTask::ClearAll]);
}

#[test]
fn reenable_after_clear_keeps_order() {
    let out = coalesce([SyncTask::ClearAll, SyncTask::ApplyAll, apply("Main")]);
    assert_eq!(out, vec![SyncTask::ClearAll, SyncTask::ApplyAll]);
}

#[test]
fn sender_from_other_thread_reaches_queue() {
    let q = TaskQueue::new();
    let tx = q.sender();
    std::thread::spawn(move || tx.push(apply("Main")))
        .join()
        .unwrap();
    assert_eq!(q.len(), 1);
    assert_eq!(q.drain(), vec![apply("Main")]);
    assert!(q.is_empty());
}
