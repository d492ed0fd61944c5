use std::time::Duration;
use voiceaid::announce::{AnnouncementState, SessionId};

mod common;
use common::{settle, TestContext, PAUSE};

#[tokio::test(start_paused = true)]
async fn test_completion_repeats_after_pause() {
    let ctx = TestContext::new();
    ctx.announcer.speak("1", "I need help").unwrap();
    settle().await;
    assert_eq!(ctx.engine.spoken(), vec!["I need help"]);
    assert!(ctx.announcer.state().is_speaking());

    ctx.engine.finish_current();
    settle().await;
    assert!(ctx.announcer.state().is_pausing());

    // Not yet
    tokio::time::sleep(PAUSE - Duration::from_millis(10)).await;
    assert_eq!(ctx.engine.spoken().len(), 1);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(ctx.engine.spoken(), vec!["I need help", "I need help"]);
    assert!(ctx.announcer.state().is_speaking());

    let notices = ctx.notifier.notices();
    assert_eq!(notices.len(), 1, "only the start is announced: {:?}", notices);
    assert!(notices[0].description.contains("I need help"));
}

#[tokio::test(start_paused = true)]
async fn test_loop_keeps_repeating() {
    let ctx = TestContext::new();
    ctx.announcer.speak("6", "Thank you").unwrap();
    settle().await;

    for _ in 0..4 {
        ctx.engine.finish_current();
        tokio::time::sleep(PAUSE + Duration::from_millis(5)).await;
    }
    assert_eq!(ctx.engine.spoken().len(), 5);
    assert_eq!(ctx.engine.cancels(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_switch_phrase_before_completion() {
    let ctx = TestContext::new();
    ctx.announcer.speak("1", "I need help").unwrap();
    ctx.announcer.speak("2", "I am bleeding").unwrap();
    settle().await;

    let submissions = ctx.engine.submissions();
    assert_eq!(ctx.engine.cancels(), 1);
    assert_eq!(submissions.len(), 2);
    let p1_session = submissions[0].0;
    let p2_session = submissions[1].0;
    assert_eq!(submissions[1].1.text, "I am bleeding");

    // P1's completion shows up late
    ctx.engine.deliver_completion(p1_session);
    settle().await;
    tokio::time::sleep(PAUSE * 3).await;

    assert_eq!(ctx.engine.submissions().len(), 2);
    assert_eq!(ctx.announcer.state().session_id(), Some(p2_session));
    assert_eq!(ctx.announcer.active_phrase().as_deref(), Some("2"));
}

#[tokio::test(start_paused = true)]
async fn test_double_click_toggles_off() {
    let ctx = TestContext::new();
    ctx.announcer.speak("1", "I need help").unwrap();
    ctx.announcer.speak("1", "I need help").unwrap();
    settle().await;

    assert_eq!(ctx.engine.spoken().len(), 1);
    assert_eq!(ctx.engine.cancels(), 1);
    assert_eq!(ctx.announcer.state(), AnnouncementState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_pause_prevents_resume() {
    let ctx = TestContext::new();
    ctx.announcer.speak("3", "Call 911").unwrap();
    settle().await;
    ctx.engine.finish_current();
    settle().await;
    assert!(ctx.announcer.state().is_pausing());

    ctx.announcer.stop("3").unwrap();
    tokio::time::sleep(PAUSE * 5).await;

    assert_eq!(ctx.engine.spoken().len(), 1);
    assert!(ctx.announcer.state().is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_out_of_order_and_duplicate_callbacks() {
    let ctx = TestContext::new();
    ctx.announcer.speak("4", "I can't breathe").unwrap();
    settle().await;
    let session = ctx.engine.last_handle().unwrap();

    // Callbacks for sessions that never existed
    ctx.engine.deliver_completion(SessionId(session.0 + 100));
    ctx.engine.deliver_error(SessionId(0), "bogus");
    settle().await;
    assert!(ctx.announcer.state().is_speaking());

    // The same completion twice schedules only one repeat
    ctx.engine.deliver_completion(session);
    ctx.engine.deliver_completion(session);
    tokio::time::sleep(PAUSE + Duration::from_millis(5)).await;
    assert_eq!(ctx.engine.spoken().len(), 2);

    tokio::time::sleep(PAUSE * 3).await;
    assert_eq!(ctx.engine.spoken().len(), 2);
    assert!(ctx.notifier.errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_engine_error_ends_session() {
    let ctx = TestContext::new();
    ctx.announcer.speak("5", "I am in pain").unwrap();
    settle().await;

    let session = ctx.engine.last_handle().unwrap();
    ctx.engine.deliver_error(session, "audio device lost");
    settle().await;

    assert!(ctx.announcer.state().is_idle());
    let errors = ctx.notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].description, "audio device lost");

    // No retry
    tokio::time::sleep(PAUSE * 3).await;
    assert_eq!(ctx.engine.spoken().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_switching_never_overlaps() {
    let ctx = TestContext::new();
    let phrases = ["1", "2", "3", "2", "2", "4", "1", "5"];
    for (i, id) in phrases.iter().enumerate() {
        ctx.announcer.speak(*id, format!("phrase {}", id)).unwrap();
        if i % 2 == 0 {
            ctx.engine.finish_current();
        }
        settle().await;
        // Every submission after the first was preceded by a cancel
        assert!(ctx.engine.submissions().len() <= ctx.engine.cancels() + 1);
    }
    tokio::time::sleep(PAUSE * 2).await;

    let state = ctx.announcer.state();
    let active = state.session_id().unwrap();
    assert_eq!(state.phrase_id(), Some("5"));
    // Everything submitted after settling belongs to the surviving session
    let latest = ctx.engine.last_handle().unwrap();
    assert_eq!(latest, active);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_transitions() {
    let ctx = TestContext::new();
    let mut rx = ctx.announcer.subscribe();

    ctx.announcer.speak("7", "I am thirsty").unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_speaking());

    ctx.engine.finish_current();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_pausing());

    ctx.announcer.teardown().unwrap();
    rx.changed().await.unwrap();
    assert!(rx.borrow_and_update().is_idle());
}

#[tokio::test(start_paused = true)]
async fn test_dropping_announcer_tears_down() {
    let ctx = TestContext::new();
    ctx.announcer.speak("8", "I am hungry").unwrap();
    settle().await;
    ctx.engine.finish_current();
    settle().await;

    let TestContext {
        engine,
        announcer,
        service,
        ..
    } = ctx;
    drop(announcer);
    service.await.unwrap();

    assert_eq!(engine.cancels(), 1);
    tokio::time::sleep(PAUSE * 3).await;
    assert_eq!(engine.spoken().len(), 1);
}
