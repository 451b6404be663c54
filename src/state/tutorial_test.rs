use super::*;
use crate::state::test_helpers::user;
use crate::storage::MemoryStore;

fn tutorial() -> (Arc<MemoryStore>, Tutorial) {
    let store = Arc::new(MemoryStore::new());
    let tut = Tutorial::new(store.clone());
    (store, tut)
}

// =============================================================================
// TutorialStep
// =============================================================================

#[test]
fn steps_advance_in_order_and_stop() {
    assert_eq!(TutorialStep::Welcome.next(), Some(TutorialStep::Messaging));
    assert_eq!(TutorialStep::Uploads.next(), Some(TutorialStep::Ready));
    assert_eq!(TutorialStep::Ready.next(), None);
    assert!(TutorialStep::Ready.is_last());
}

#[test]
fn steps_back_is_bounded() {
    assert_eq!(TutorialStep::Welcome.prev(), None);
    assert_eq!(TutorialStep::Messaging.prev(), Some(TutorialStep::Welcome));
}

// =============================================================================
// Tutorial
// =============================================================================

#[test]
fn hidden_without_user() {
    let (_, mut tut) = tutorial();
    tut.load_for(None);
    assert!(!tut.is_visible());
}

#[test]
fn visible_for_new_user() {
    let (_, mut tut) = tutorial();
    tut.load_for(Some(&user("u1")));
    assert!(tut.is_visible());
    assert_eq!(tut.step(), TutorialStep::Welcome);
}

#[test]
fn walking_all_steps_dismisses_and_persists() {
    let (store, mut tut) = tutorial();
    tut.load_for(Some(&user("u1")));

    for _ in 0..3 {
        tut.advance().unwrap();
        assert!(tut.is_visible());
    }
    assert_eq!(tut.step(), TutorialStep::Ready);
    tut.advance().unwrap();
    assert!(!tut.is_visible());
    assert_eq!(store.get("tutorial_shown_user_u1").as_deref(), Some("true"));

    tut.load_for(Some(&user("u1")));
    assert!(!tut.is_visible());
}

#[test]
fn back_moves_one_step() {
    let (_, mut tut) = tutorial();
    tut.load_for(Some(&user("u1")));
    tut.back();
    assert_eq!(tut.step(), TutorialStep::Welcome);
    tut.advance().unwrap();
    tut.back();
    assert_eq!(tut.step(), TutorialStep::Welcome);
}

#[test]
fn dismiss_is_per_user() {
    let (_, mut tut) = tutorial();
    tut.load_for(Some(&user("u1")));
    tut.dismiss().unwrap();

    tut.load_for(Some(&user("u2")));
    assert!(tut.is_visible());
}

#[test]
fn advance_when_hidden_is_noop() {
    let (store, mut tut) = tutorial();
    tut.load_for(None);
    tut.advance().unwrap();
    assert!(store.is_empty());
}
