//! Debounced validation through the form controller.
//!
//! Timing tests run on a paused tokio clock, so sleeps advance virtual time
//! deterministically.


use std::time::Duration;

use formwork_form::prelude::*;
use test_utils::{ProbeValidator, SnapshotLog, form, init_tracing, signup_fields};

const DELAY: Duration = Duration::from_millis(300);

fn probed_form(probe: &ProbeValidator) -> FormController {
    form(
        vec![
            FieldDefinition::new("query", FieldType::Text).with_validator(probe.validator()),
            FieldDefinition::new("email", FieldType::Text).with_validators([required(), email()]),
        ],
        ValidationStrategy::RealTimeOnly,
    )
}

#[tokio::test(start_paused = true)]
async fn burst_of_updates_validates_once_with_last_value() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);

    for value in ["a", "ab", "abc"] {
        form.update_field_with_debounce("query", value, DELAY).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(probe.runs(), 0, "still inside the debounce window");

    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(probe.runs(), 1);
    assert_eq!(probe.seen(), [Some(FieldValue::from("abc"))]);
    assert_eq!(form.pending_validations(), 0);
}

#[tokio::test(start_paused = true)]
async fn value_is_applied_before_errors_are_recomputed() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);

    let snapshot = form
        .update_field_with_debounce("email", "not-an-email", DELAY)
        .unwrap();
    assert_eq!(snapshot.value("email"), Some(&FieldValue::from("not-an-email")));
    assert!(!snapshot.has_error("email"));
    assert!(form.is_field_touched("email"));

    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(
        form.snapshot().error("email").map(String::as_str),
        Some("Invalid email address")
    );
}

#[tokio::test(start_paused = true)]
async fn fields_debounce_independently() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);

    form.update_field_with_debounce("query", "q", DELAY).unwrap();
    form.update_field_with_debounce("email", "bad", DELAY * 3).unwrap();
    assert_eq!(form.pending_validations(), 2);

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 1);
    assert!(!form.snapshot().has_error("email"));

    tokio::time::sleep(DELAY * 2).await;
    assert!(form.snapshot().has_error("email"));
}

#[tokio::test(start_paused = true)]
async fn direct_write_cancels_pending_validation() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);

    form.update_field_with_debounce("query", "typed", DELAY).unwrap();
    form.update_field("query", "pasted").unwrap();
    assert_eq!(form.pending_validations(), 0);

    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(probe.seen(), [Some(FieldValue::from("pasted"))]);
}

#[tokio::test(start_paused = true)]
async fn touch_field_flushes_pending_validation() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);

    form.update_field_with_debounce("query", "blurred", DELAY).unwrap();
    form.touch_field("query").unwrap();
    assert_eq!(probe.runs(), 1);

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 1, "the timer was cancelled");
}

#[tokio::test(start_paused = true)]
async fn removed_field_timer_is_a_no_op() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);
    let log = SnapshotLog::default();

    form.update_field_with_debounce("query", "gone", DELAY).unwrap();
    form.remove_field("query").unwrap();
    assert_eq!(form.pending_validations(), 0);
    log.attach(&form);

    tokio::time::sleep(DELAY * 2).await;

    assert_eq!(probe.runs(), 0);
    assert_eq!(log.len(), 1, "nothing published after removal");
    assert!(!form.snapshot().contains_field("query"));
}

#[tokio::test(start_paused = true)]
async fn dispose_cancels_all_timers() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);

    form.update_field_with_debounce("query", "a", DELAY).unwrap();
    form.update_field_with_debounce("email", "b", DELAY).unwrap();
    form.dispose();
    assert_eq!(form.pending_validations(), 0);

    // Values still apply after disposal; validation never runs.
    let snapshot = form.update_field_with_debounce("query", "c", DELAY).unwrap();
    assert_eq!(snapshot.value("query"), Some(&FieldValue::from("c")));

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 0);
    assert!(form.snapshot().errors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_form_cancels_timers() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);

    form.update_field_with_debounce("query", "a", DELAY).unwrap();
    drop(form);

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 0);
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_pending_validation() {
    let probe = ProbeValidator::default();
    let form = probed_form(&probe);

    form.update_field_with_debounce("query", "a", DELAY).unwrap();
    form.reset_form();

    tokio::time::sleep(DELAY * 2).await;
    assert_eq!(probe.runs(), 0);
    assert_eq!(form.snapshot().value("query"), None);
}

#[tokio::test(start_paused = true)]
async fn configured_default_delay_is_used() {
    init_tracing();
    let probe = ProbeValidator::default();
    let form = FormController::new(
        [FieldDefinition::new("query", FieldType::Text).with_validator(probe.validator())],
        FormConfig::new()
            .with_strategy(ValidationStrategy::RealTimeOnly)
            .with_debounce(Duration::from_millis(50)),
    )
    .unwrap();

    form.update_field_debounced("query", "fast").unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(probe.runs(), 0);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(probe.runs(), 1);
}

#[tokio::test(start_paused = true)]
async fn watch_receiver_observes_value_then_validation() {
    let form = form(signup_fields(), ValidationStrategy::RealTimeOnly);
    let mut receiver = form.watch();

    form.update_field_with_debounce("email", "nope", DELAY).unwrap();

    receiver.changed().await.unwrap();
    {
        let snapshot = receiver.borrow_and_update();
        assert_eq!(snapshot.value("email"), Some(&FieldValue::from("nope")));
        assert!(!snapshot.has_error("email"));
    }

    receiver.changed().await.unwrap();
    assert!(receiver.borrow_and_update().has_error("email"));
}

#[test]
fn without_runtime_validation_runs_immediately() {
    let form = form(signup_fields(), ValidationStrategy::RealTimeOnly);

    form.update_field_with_debounce("email", "nope", DELAY).unwrap();

    assert!(form.snapshot().has_error("email"));
    assert_eq!(form.pending_validations(), 0);
}
