//! Integration test: hardware emergency stop against a running scheduler.

use super::support::{rig, settle, INTERVAL};
use carebot_common::alert::Severity;
use carebot_common::posture::Posture;
use carebot_control::{EmergencyStop, SchedulerState};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn estop_mid_move_halts_without_pausing() {
    let rig = rig();
    let handle = rig.start().await;
    let estop = EmergencyStop::new(
        Arc::clone(&rig.driver),
        rig.alerts.clone(),
        Duration::from_millis(300),
    );

    // First cycle starts at t = 60.3 s; press the button mid-move.
    tokio::time::sleep(INTERVAL - Duration::from_millis(550)).await;
    assert!(rig.driver.is_moving());
    assert!(estop.trigger());
    assert!(!estop.trigger());
    settle().await;

    assert!(rig.driver.channel_state().all_neutral());
    assert_eq!(rig.scheduler.current_posture(), Posture::Supine);
    // The button does not pause the scheduler.
    assert_eq!(rig.scheduler.state(), SchedulerState::Running);
    let critical: Vec<_> = rig
        .alerts
        .events()
        .into_iter()
        .filter(|e| e.severity == Severity::Critical)
        .collect();
    // One from the button, one from the interrupted cycle.
    assert_eq!(critical.len(), 2);
    assert!(critical.iter().all(|e| e.requires_manual));

    // The next scheduled cycle moves again.
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(rig.scheduler.snapshot().total_rotations, 1);
    assert_eq!(rig.scheduler.current_posture(), Posture::Supine);

    rig.scheduler.stop();
    handle.await.unwrap();
}
