//! Integration test: timer loop, pause/resume, manual override, motion failures.

use super::support::{rig, INTERVAL};
use carebot_common::alert::Severity;
use carebot_common::posture::Posture;
use carebot_control::state::machine::Transition;
use carebot_control::{CycleError, CycleOutcome, SchedulerState};
use carebot_hal::MotionError;
use std::sync::Arc;
use std::time::Duration;

// ── Timer loop ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn timer_loop_follows_sequence_until_stopped() {
    let rig = rig();
    let handle = rig.start().await;

    let snapshot = rig.scheduler.snapshot();
    assert_eq!(snapshot.state, SchedulerState::Running);
    assert_eq!(snapshot.current_position, Posture::Supine);
    assert_eq!(snapshot.total_rotations, 0);
    assert!(snapshot.next_rotation_time.is_some());

    tokio::time::sleep(INTERVAL).await;
    let snapshot = rig.scheduler.snapshot();
    assert_eq!(snapshot.current_position, Posture::LeftLateral);
    assert_eq!(snapshot.total_rotations, 1);
    assert!(snapshot.last_rotation_time.is_some());
    assert_eq!(rig.driver.channel_state().values, [60.0, 10.0, 60.0, 10.0]);

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(rig.scheduler.current_posture(), Posture::Supine);
    assert_eq!(rig.scheduler.snapshot().total_rotations, 2);
    assert_eq!(rig.alerts.count(Severity::Info), 2);

    assert!(rig.scheduler.stop().is_ok());
    handle.await.expect("loop exits after stop");
    let snapshot = rig.scheduler.snapshot();
    assert_eq!(snapshot.state, SchedulerState::Stopped);
    assert!(snapshot.next_rotation_time.is_none());
}

#[tokio::test(start_paused = true)]
async fn second_run_is_rejected_while_running() {
    let rig = rig();
    let handle = rig.start().await;

    // Returns at once instead of running a second loop.
    rig.scheduler.run().await;
    assert_eq!(rig.scheduler.state(), SchedulerState::Running);

    rig.scheduler.stop();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stop_during_initial_move_is_final() {
    let rig = rig();
    let first = {
        let scheduler = rig.scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };
    // Initial move takes 3 x 100 ms.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rig.scheduler.stop().is_ok());

    // A later run is refused instead of reviving the first loop.
    rig.scheduler.run().await;
    assert_eq!(rig.scheduler.state(), SchedulerState::Stopped);

    tokio::time::timeout(Duration::from_secs(1), first)
        .await
        .expect("first loop exits once its initial move ends")
        .unwrap();

    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(rig.scheduler.snapshot().total_rotations, 0);
    assert!(rig.alerts.events().is_empty());
    assert!(matches!(rig.scheduler.pause(None), Transition::Rejected(_)));
}

// ── Pause / resume ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn paused_intervals_change_nothing() {
    let rig = rig();
    let handle = rig.start().await;

    assert_eq!(rig.scheduler.pause(None), Transition::Ok(SchedulerState::Paused));
    tokio::time::sleep(INTERVAL * 5).await;

    let snapshot = rig.scheduler.snapshot();
    assert!(snapshot.is_paused);
    assert_eq!(snapshot.total_rotations, 0);
    assert_eq!(snapshot.current_position, Posture::Supine);
    assert!(rig.alerts.events().is_empty());

    // No catch-up: one interval after resuming, exactly one rotation.
    rig.scheduler.resume();
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(rig.scheduler.snapshot().total_rotations, 1);
    assert_eq!(rig.scheduler.current_posture(), Posture::LeftLateral);

    rig.scheduler.stop();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn timed_pause_resumes_by_itself() {
    let rig = rig();
    let handle = rig.start().await;

    rig.scheduler.pause(Some(Duration::from_secs(600)));
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert!(rig.scheduler.snapshot().is_paused);

    tokio::time::sleep(Duration::from_secs(301)).await;
    assert_eq!(rig.scheduler.state(), SchedulerState::Running);

    rig.scheduler.stop();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn stale_timed_resume_is_ignored() {
    let rig = rig();
    let handle = rig.start().await;

    rig.scheduler.pause(Some(Duration::from_secs(600)));
    tokio::time::sleep(Duration::from_secs(1)).await;
    rig.scheduler.resume();
    rig.scheduler.pause(None);

    tokio::time::sleep(Duration::from_secs(700)).await;
    assert_eq!(rig.scheduler.state(), SchedulerState::Paused);

    rig.scheduler.stop();
    handle.await.unwrap();
}

// ── Manual override ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn manual_rotation_without_target_follows_sequence() {
    let rig = rig();

    let reached = rig.scheduler.request_manual_rotation(None).await.unwrap();
    assert_eq!(reached, Posture::LeftLateral);
    assert_eq!(rig.scheduler.sequence_index(), 1);

    let reached = rig
        .scheduler
        .request_manual_rotation(Some(Posture::RightLateral))
        .await
        .unwrap();
    assert_eq!(reached, Posture::RightLateral);
    assert_eq!(rig.scheduler.sequence_index(), 1);
    assert_eq!(rig.scheduler.snapshot().total_rotations, 2);
    assert_eq!(rig.driver.channel_state().values, [10.0, 60.0, 10.0, 60.0]);
}

#[tokio::test(start_paused = true)]
async fn manual_rotation_does_not_shift_timer() {
    let rig = rig();
    let handle = rig.start().await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    rig.scheduler
        .request_manual_rotation(Some(Posture::RightLateral))
        .await
        .unwrap();

    // Timer still fires at its original time (t = 60.3 s).
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(rig.scheduler.current_posture(), Posture::LeftLateral);
    assert_eq!(rig.scheduler.snapshot().total_rotations, 2);

    rig.scheduler.stop();
    handle.await.unwrap();
}

// ── Motion ownership and failures ───────────────────────────────────

#[tokio::test(start_paused = true)]
async fn cycle_during_foreign_move_is_busy_without_halt() {
    let rig = rig();
    let driver = Arc::clone(&rig.driver);
    let target = *rig.scheduler.catalog().profile(Posture::RightLateral);
    let mover = tokio::spawn(async move {
        driver.move_to(&target, 10, Duration::from_secs(1)).await
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(rig.scheduler.run_cycle().await, CycleOutcome::Busy);
    assert_eq!(rig.driver.halt_count(), 0);
    let events = rig.alerts.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity, Severity::Warning);
    assert!(!events[0].requires_manual);

    // Manual callers get the rejection back directly, no extra alert.
    let manual = rig.scheduler.request_manual_rotation(None).await;
    assert_eq!(manual, Err(CycleError::Motion(MotionError::Busy)));
    assert_eq!(rig.alerts.events().len(), 1);

    mover.await.unwrap().expect("foreign move completes");
    assert_eq!(rig.scheduler.snapshot().total_rotations, 0);
}

#[tokio::test(start_paused = true)]
async fn motion_fault_halts_and_scheduler_keeps_running() {
    let rig = rig();
    let handle = rig.start().await;

    rig.faults.trip("h-bridge overcurrent");
    tokio::time::sleep(INTERVAL).await;

    assert_eq!(rig.driver.halt_count(), 1);
    assert!(rig.driver.channel_state().all_neutral());
    let critical: Vec<_> = rig
        .alerts
        .events()
        .into_iter()
        .filter(|e| e.severity == Severity::Critical)
        .collect();
    assert_eq!(critical.len(), 1);
    assert!(critical[0].requires_manual);
    assert!(critical[0].message.contains("h-bridge overcurrent"));

    let snapshot = rig.scheduler.snapshot();
    assert_eq!(snapshot.state, SchedulerState::Running);
    assert_eq!(snapshot.current_position, Posture::Supine);
    assert_eq!(snapshot.total_rotations, 0);

    // Next interval proceeds normally once the fault clears.
    rig.faults.clear();
    tokio::time::sleep(INTERVAL).await;
    assert_eq!(rig.scheduler.current_posture(), Posture::Supine);
    assert_eq!(rig.scheduler.snapshot().total_rotations, 1);

    rig.scheduler.stop();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn halt_during_cycle_reports_failure() {
    let rig = rig();
    let scheduler = rig.scheduler.clone();
    let cycle = tokio::spawn(async move { scheduler.run_cycle().await });

    tokio::time::sleep(Duration::from_millis(150)).await;
    rig.driver.emergency_halt();

    let outcome = cycle.await.unwrap();
    assert_eq!(
        outcome,
        CycleOutcome::Failed(MotionError::Halted.to_string())
    );
    assert_eq!(rig.alerts.count(Severity::Critical), 1);
    assert_eq!(rig.scheduler.current_posture(), Posture::Supine);
    assert!(rig.driver.channel_state().all_neutral());
}
