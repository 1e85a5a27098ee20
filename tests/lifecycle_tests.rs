//! End-to-end lifecycle scenarios against a live PostgreSQL instance.
//! Run with a provisioned database:
//!   TEST_DATABASE_URL=postgres://localhost/rosterhub_test cargo test -- --ignored

mod common;

use chrono::{Duration, Utc};
use common::TestContext;
use pretty_assertions::assert_eq;
use serial_test::serial;

use rosterhub::database::models::{
    AbsenceNoticeType, AttendanceEntry, AttendanceStatus, MedicalStatus, PlayerStatus,
    ReviewNoticeInput, SubmitNoticeInput, TransferRequestStatus,
};
use rosterhub::error::AppError;

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn free_agent_transfer_binds_athlete_and_creates_player() {
    let ctx = TestContext::new().await.expect("test context");
    let club_id = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();

    // Free agent: no club binding yet.
    assert!(athlete.current_club_id.is_none());

    let request = ctx
        .transfer
        .request_transfer(club_id, &athlete.passport_code)
        .await
        .unwrap();
    assert_eq!(request.status, TransferRequestStatus::Pending);

    // Re-requesting is idempotent: same request comes back.
    let again = ctx
        .transfer
        .request_transfer(club_id, &athlete.passport_code)
        .await
        .unwrap();
    assert_eq!(again.id, request.id);

    let player = ctx
        .transfer
        .approve_transfer(guardian.id, request.id)
        .await
        .unwrap();
    assert_eq!(player.club_id, club_id);
    assert_eq!(player.status, PlayerStatus::Active);
    assert_eq!(player.first_name, athlete.first_name);

    let bound = ctx.athletes.find_by_id(athlete.id).await.unwrap().unwrap();
    assert_eq!(bound.current_club_id, Some(club_id));

    // The club-local parent user was created exactly once for the pair.
    let parent = ctx.users.find_by_email(&guardian.email).await.unwrap().unwrap();
    assert_eq!(parent.guardian_id, Some(guardian.id));
    assert_eq!(parent.password_hash, guardian.password_hash);

    // Double approval performs no further writes.
    let err = ctx
        .transfer
        .approve_transfer(guardian.id, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn transfer_request_for_bound_athlete_is_rejected() {
    let ctx = TestContext::new().await.expect("test context");
    let club_a = ctx.create_club().await.unwrap();
    let club_b = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();

    ctx.enroll_athlete(club_a, &guardian, &athlete).await.unwrap();

    let err = ctx
        .transfer
        .request_transfer(club_b, &athlete.passport_code)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn expired_pending_request_is_rejected_and_retired_at_approval() {
    let ctx = TestContext::new().await.expect("test context");
    let club_id = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();

    let request = ctx
        .transfer
        .request_transfer(club_id, &athlete.passport_code)
        .await
        .unwrap();
    ctx.expire_transfer_request(request.id).await.unwrap();

    let err = ctx
        .transfer
        .approve_transfer(guardian.id, request.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let stored = ctx.transfers_repo.find_by_id(request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TransferRequestStatus::Expired);

    // The athlete stayed a free agent.
    let athlete = ctx.athletes.find_by_id(athlete.id).await.unwrap().unwrap();
    assert!(athlete.current_club_id.is_none());
}

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn withdrawal_completes_only_after_cooloff() {
    let ctx = TestContext::new().await.expect("test context");
    let club_id = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();
    let player = ctx.enroll_athlete(club_id, &guardian, &athlete).await.unwrap();

    let pending = ctx
        .withdrawal
        .request_withdrawal(guardian.id, athlete.id)
        .await
        .unwrap();
    assert_eq!(pending.status, PlayerStatus::PendingWithdrawal);

    // 23 hours in: the sweep must not touch the row.
    ctx.age_withdrawal(player.id, Utc::now() - Duration::hours(23))
        .await
        .unwrap();
    assert_eq!(ctx.reconciler.run_sweep().await, 0);
    let still = ctx.players.find_by_id(player.id).await.unwrap().unwrap();
    assert_eq!(still.status, PlayerStatus::PendingWithdrawal);

    // 25 hours in: completed, team cleared, athlete released.
    ctx.age_withdrawal(player.id, Utc::now() - Duration::hours(25))
        .await
        .unwrap();
    assert_eq!(ctx.reconciler.run_sweep().await, 1);

    let left = ctx.players.find_by_id(player.id).await.unwrap().unwrap();
    assert_eq!(left.status, PlayerStatus::Left);
    assert!(left.team_id.is_none());

    let freed = ctx.athletes.find_by_id(athlete.id).await.unwrap().unwrap();
    assert!(freed.current_club_id.is_none());

    // Idempotence: a second sweep finds nothing.
    assert_eq!(ctx.reconciler.run_sweep().await, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn cancelled_withdrawal_leaves_no_trace_for_the_reconciler() {
    let ctx = TestContext::new().await.expect("test context");
    let club_id = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();
    let player = ctx.enroll_athlete(club_id, &guardian, &athlete).await.unwrap();

    ctx.withdrawal
        .request_withdrawal(guardian.id, athlete.id)
        .await
        .unwrap();
    let restored = ctx
        .withdrawal
        .cancel_withdrawal(guardian.id, athlete.id)
        .await
        .unwrap();
    assert_eq!(restored.status, PlayerStatus::Active);
    assert!(restored.withdrawal_requested_at.is_none());

    // Even a very old timestamp cannot resurrect a cancelled withdrawal.
    assert_eq!(ctx.reconciler.run_sweep().await, 0);
    let player = ctx.players.find_by_id(player.id).await.unwrap().unwrap();
    assert_eq!(player.status, PlayerStatus::Active);
    assert_eq!(player.club_id, club_id);
}

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn club_termination_releases_athlete_immediately() {
    let ctx = TestContext::new().await.expect("test context");
    let club_id = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();
    let player = ctx.enroll_athlete(club_id, &guardian, &athlete).await.unwrap();
    let team_id = ctx.create_team(club_id, None).await.unwrap();
    ctx.assign_player_to_team(player.id, team_id).await.unwrap();

    let input = rosterhub::database::models::TerminateLinkInput {
        reason: Some("Moved away".to_string()),
        letter_reference: Some("WL-2026-001".to_string()),
        destination_club_email: Some("office@newclub.example".to_string()),
        send_package: true,
    };
    let left = ctx
        .withdrawal
        .terminate_link(club_id, player.id, input)
        .await
        .unwrap();
    assert_eq!(left.status, PlayerStatus::Left);
    assert!(left.team_id.is_none());

    let freed = ctx.athletes.find_by_id(athlete.id).await.unwrap().unwrap();
    assert!(freed.current_club_id.is_none());

    // Team history row got closed.
    let history = ctx.teams.membership_history(player.id).await.unwrap();
    assert!(history.iter().all(|m| m.left_at.is_some()));

    // Terminating twice is a business error.
    let err = ctx
        .withdrawal
        .terminate_link(
            club_id,
            player.id,
            rosterhub::database::models::TerminateLinkInput {
                reason: None,
                letter_reference: None,
                destination_club_email: None,
                send_package: false,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn finalize_respects_session_end_and_locks_attendance() {
    let ctx = TestContext::new().await.expect("test context");
    let club_id = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();
    let player = ctx.enroll_athlete(club_id, &guardian, &athlete).await.unwrap();
    let staff = ctx.create_staff(club_id, "coach").await.unwrap();
    let team_id = ctx.create_team(club_id, Some(staff.id)).await.unwrap();
    ctx.assign_player_to_team(player.id, team_id).await.unwrap();

    // Ends tomorrow: finalize must fail.
    let tomorrow = (Utc::now() + Duration::days(1)).date_naive();
    let future_training = ctx
        .create_training(club_id, team_id, tomorrow, "20:00:00")
        .await
        .unwrap();
    let err = ctx
        .attendance
        .finalize(club_id, staff.id, future_training)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Ended yesterday: finalize succeeds, then everything is locked.
    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let past_training = ctx
        .create_training(club_id, team_id, yesterday, "20:00:00")
        .await
        .unwrap();

    ctx.attendance
        .mark_attendance(
            club_id,
            staff.id,
            past_training,
            vec![AttendanceEntry {
                player_id: player.id,
                status: AttendanceStatus::Present,
                justification: None,
            }],
        )
        .await
        .unwrap();

    let finalized = ctx
        .attendance
        .finalize(club_id, staff.id, past_training)
        .await
        .unwrap();
    assert!(finalized.is_finalized);
    assert_eq!(finalized.finalized_by, Some(staff.id));

    let err = ctx
        .attendance
        .finalize(club_id, staff.id, past_training)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = ctx
        .attendance
        .mark_attendance(
            club_id,
            staff.id,
            past_training,
            vec![AttendanceEntry {
                player_id: player.id,
                status: AttendanceStatus::Absent,
                justification: None,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn approved_injury_notice_gates_future_attendance() {
    let ctx = TestContext::new().await.expect("test context");
    let club_id = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();
    let player = ctx.enroll_athlete(club_id, &guardian, &athlete).await.unwrap();
    let coach = ctx.create_staff(club_id, "coach").await.unwrap();
    let team_id = ctx.create_team(club_id, Some(coach.id)).await.unwrap();
    ctx.assign_player_to_team(player.id, team_id).await.unwrap();

    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let missed_training = ctx
        .create_training(club_id, team_id, yesterday, "20:00:00")
        .await
        .unwrap();

    let notice = ctx
        .absence
        .submit(
            guardian.id,
            SubmitNoticeInput {
                athlete_id: athlete.id,
                training_id: missed_training,
                notice_type: AbsenceNoticeType::Absence,
                reason: Some("Twisted an ankle at school".to_string()),
            },
        )
        .await
        .unwrap();

    let approved = ctx
        .absence
        .approve(
            coach.id,
            club_id,
            notice.id,
            ReviewNoticeInput {
                create_injury: true,
                diagnosis: Some("Sprained ankle".to_string()),
                recovery_days: Some(14),
            },
        )
        .await
        .unwrap();
    assert!(approved.injury_id.is_some());

    // The approval wrote a justified attendance row.
    let row = ctx
        .attendance_repo
        .find_for_player(missed_training, player.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, AttendanceStatus::Justified);

    // And flipped the player to injured.
    let player_now = ctx.players.find_by_id(player.id).await.unwrap().unwrap();
    assert_eq!(player_now.medical_status, MedicalStatus::Injured);

    // A later PRESENT mark is silently overridden to ABSENT.
    let next_session = ctx
        .create_training(club_id, team_id, yesterday, "21:00:00")
        .await
        .unwrap();
    let saved = ctx
        .attendance
        .mark_attendance(
            club_id,
            coach.id,
            next_session,
            vec![AttendanceEntry {
                player_id: player.id,
                status: AttendanceStatus::Present,
                justification: None,
            }],
        )
        .await
        .unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].status, AttendanceStatus::Absent);
}

#[tokio::test]
#[serial]
#[ignore = "requires a postgres database (TEST_DATABASE_URL)"]
async fn notice_submission_requires_ownership_and_open_training() {
    let ctx = TestContext::new().await.expect("test context");
    let club_id = ctx.create_club().await.unwrap();
    let guardian = ctx.create_guardian().await.unwrap();
    let stranger = ctx.create_guardian().await.unwrap();
    let athlete = ctx.create_athlete(guardian.id).await.unwrap();
    let player = ctx.enroll_athlete(club_id, &guardian, &athlete).await.unwrap();
    let coach = ctx.create_staff(club_id, "coach").await.unwrap();
    let team_id = ctx.create_team(club_id, Some(coach.id)).await.unwrap();
    ctx.assign_player_to_team(player.id, team_id).await.unwrap();

    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let training = ctx
        .create_training(club_id, team_id, yesterday, "20:00:00")
        .await
        .unwrap();

    // A guardian who does not own the athlete gets NotFound, not details.
    let err = ctx
        .absence
        .submit(
            stranger.id,
            SubmitNoticeInput {
                athlete_id: athlete.id,
                training_id: training,
                notice_type: AbsenceNoticeType::Absence,
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Once finalized, the session takes no more notices.
    ctx.attendance.finalize(club_id, coach.id, training).await.unwrap();
    let err = ctx
        .absence
        .submit(
            guardian.id,
            SubmitNoticeInput {
                athlete_id: athlete.id,
                training_id: training,
                notice_type: AbsenceNoticeType::Absence,
                reason: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}
