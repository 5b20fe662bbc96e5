//! Integration test: gate verdicts flowing through the scheduler.

use super::support::rig;
use carebot_common::alert::Severity;
use carebot_common::posture::Posture;
use carebot_control::{CheckOutcome, CycleError, CycleOutcome};

#[tokio::test(start_paused = true)]
async fn blocked_cycle_changes_nothing_but_the_index() {
    let rig = rig();
    rig.set_presence(CheckOutcome::Blocked("no patient".into()));
    let before = rig.driver.channel_state();

    let outcome = rig.scheduler.run_cycle().await;
    assert_eq!(outcome, CycleOutcome::Blocked(vec!["no patient".into()]));

    assert_eq!(rig.driver.channel_state(), before);
    let snapshot = rig.scheduler.snapshot();
    assert_eq!(snapshot.current_position, Posture::Supine);
    assert_eq!(snapshot.total_rotations, 0);

    let events = rig.alerts.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Warning);
    assert!(events[0].requires_manual);
    assert!(events[0].message.contains("no patient"));

    // The advance is kept: the blocked left-lateral turn is not retried.
    assert_eq!(rig.scheduler.sequence_index(), 1);
    rig.set_presence(CheckOutcome::Ok);
    assert_eq!(rig.scheduler.run_cycle().await, CycleOutcome::Rotated(Posture::Supine));
    assert_eq!(rig.scheduler.run_cycle().await, CycleOutcome::Rotated(Posture::RightLateral));
}

#[tokio::test(start_paused = true)]
async fn blocked_manual_request_returns_reasons() {
    let rig = rig();
    rig.set_presence(CheckOutcome::Blocked("no patient".into()));

    let result = rig
        .scheduler
        .request_manual_rotation(Some(Posture::LeftLateral))
        .await;
    assert_eq!(
        result,
        Err(CycleError::Blocked {
            reasons: vec!["no patient".into()]
        })
    );
    assert_eq!(rig.alerts.count(Severity::Warning), 1);
    assert_eq!(rig.driver.channel_state().values, [0.0; 4]);
}

#[tokio::test(start_paused = true)]
async fn degraded_sensor_warns_and_still_moves() {
    let rig = rig();
    rig.set_presence(CheckOutcome::Degraded("pressure sensor offline".into()));

    assert_eq!(
        rig.scheduler.run_cycle().await,
        CycleOutcome::Rotated(Posture::LeftLateral)
    );

    let events = rig.alerts.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].severity, Severity::Warning);
    assert!(!events[0].requires_manual);
    assert!(events[0].message.contains("pressure sensor offline"));
    assert_eq!(events[1].severity, Severity::Info);
    assert!(!events[1].requires_manual);

    rig.alerts.clear();
    rig.set_presence(CheckOutcome::Ok);
    rig.scheduler.run_cycle().await;
    assert_eq!(rig.alerts.count(Severity::Warning), 0);
}
