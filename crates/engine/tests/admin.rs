//! Integration tests for project, task and membership administration and
//! the read-side helpers.

mod common;

use std::time::Duration;

use common::{date, day, request, seed_default, service};
use common::{MANAGER, OTHER_MANAGER, USER};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use timesheet_db::models::membership::AddMember;
use timesheet_db::models::project::{CreateProject, UpdateProjectSchedule};
use timesheet_db::models::status::TaskOrigin;
use timesheet_db::models::task::CreateTask;
use timesheet_engine::Outcome;

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn project_with_inverted_window_is_rejected(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 24));
    let err = svc
        .create_project(&CreateProject {
            title: "Backwards".to_string(),
            start_date: date(2021, 2, 1),
            end_date: date(2021, 1, 1),
            billable_hours: None,
            non_billable_hours: None,
            manager_id: MANAGER,
        })
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Validation);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_owner_may_update_schedule(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 24));
    let seed = seed_default(&svc, &[]).await;

    let err = svc
        .update_project_schedule(
            OTHER_MANAGER,
            seed.project.id,
            &UpdateProjectSchedule {
                billable_hours: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Forbidden);

    let updated = svc
        .update_project_schedule(
            MANAGER,
            seed.project.id,
            &UpdateProjectSchedule {
                end_date: Some(date(2021, 3, 31)),
                billable_hours: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.end_date, date(2021, 3, 31));
    assert_eq!(updated.billable_hours, 10);
    assert_eq!(updated.start_date, seed.project.start_date);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn schedule_cannot_strand_active_tasks(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 24));
    let seed = seed_default(&svc, &["Design"]).await;

    let err = svc
        .update_project_schedule(
            MANAGER,
            seed.project.id,
            &UpdateProjectSchedule {
                end_date: Some(date(2021, 1, 31)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Validation);

    // Once the task is removed the window may shrink.
    svc.remove_task(MANAGER, seed.task(0)).await.unwrap();
    svc.update_project_schedule(
        MANAGER,
        seed.project.id,
        &UpdateProjectSchedule {
            end_date: Some(date(2021, 1, 31)),
            ..Default::default()
        },
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_project_is_not_found(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 24));
    let err = svc
        .update_project_schedule(MANAGER, 4242, &UpdateProjectSchedule::default())
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::NotFound);
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn task_window_must_fit_project(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 24));
    let seed = seed_default(&svc, &[]).await;

    let err = svc
        .create_task(
            MANAGER,
            TaskOrigin::Manager,
            &CreateTask {
                project_id: seed.project.id,
                title: "Too long".to_string(),
                start_date: date(2021, 1, 2),
                end_date: date(2021, 3, 1),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Validation);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_task_references_membership(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 24));
    let seed = seed_default(&svc, &[]).await;
    let input = CreateTask {
        project_id: seed.project.id,
        title: "Self-added".to_string(),
        start_date: date(2021, 1, 10),
        end_date: date(2021, 1, 20),
    };

    let task = svc
        .create_task(USER, TaskOrigin::Member, &input)
        .await
        .unwrap();
    assert_eq!(task.origin_id, TaskOrigin::Member.id());
    assert!(task.membership_id.is_some());

    let err = svc
        .create_task(USER + 1, TaskOrigin::Member, &input)
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Forbidden);

    let err = svc
        .create_task(USER, TaskOrigin::Manager, &input)
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Forbidden);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn removed_task_keeps_history(pool: PgPool) {
    let today = date(2021, 1, 24);
    let svc = service(&pool, today);
    let seed = seed_default(&svc, &["Design"]).await;
    svc.save_timesheets(USER, &request(today, vec![day(today, seed.project.id, &[(seed.task(0), 4)])]))
        .await
        .unwrap();

    assert!(svc.remove_task(MANAGER, seed.task(0)).await.unwrap());
    assert!(!svc.remove_task(MANAGER, seed.task(0)).await.unwrap());

    let history = svc.get_timesheets(USER, today, today).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].task_title, "Design");
}

// ---------------------------------------------------------------------------
// Memberships and assignments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn re_adding_member_reactivates_membership(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 24));
    let seed = seed_default(&svc, &["Design"]).await;

    let assigned = svc
        .get_assigned_projects(USER, date(2021, 1, 1), date(2021, 1, 31))
        .await
        .unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].tasks.len(), 1);
    let membership_id = assigned[0].project.membership_id;

    assert!(svc
        .remove_member(MANAGER, seed.project.id, USER)
        .await
        .unwrap());
    assert!(svc
        .get_assigned_projects(USER, date(2021, 1, 1), date(2021, 1, 31))
        .await
        .unwrap()
        .is_empty());

    let membership = svc
        .add_member(
            MANAGER,
            &AddMember {
                project_id: seed.project.id,
                user_id: USER,
                is_billable: Some(false),
            },
        )
        .await
        .unwrap();
    assert_eq!(membership.id, membership_id);
    assert!(!membership.is_billable);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_owner_manages_members(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 24));
    let seed = seed_default(&svc, &[]).await;

    let err = svc
        .add_member(
            OTHER_MANAGER,
            &AddMember {
                project_id: seed.project.id,
                user_id: USER + 1,
                is_billable: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.outcome(), Outcome::Forbidden);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn administration_runs_on_a_single_connection(
    pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let pool = pool_options
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options)
        .await
        .unwrap();
    let svc = service(&pool, date(2021, 1, 24));
    let seed = seed_default(&svc, &["Design"]).await;

    assert!(svc.remove_member(MANAGER, seed.project.id, USER).await.unwrap());
    let membership = svc
        .add_member(
            MANAGER,
            &AddMember {
                project_id: seed.project.id,
                user_id: USER,
                is_billable: Some(false),
            },
        )
        .await
        .unwrap();
    assert!(membership.is_active());
    assert!(svc.remove_task(MANAGER, seed.task(0)).await.unwrap());
}

// ---------------------------------------------------------------------------
// Date helpers
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn date_helpers_follow_policy_and_clock(pool: PgPool) {
    let svc = service(&pool, date(2021, 1, 15));

    let candidates = [date(2020, 12, 31), date(2021, 1, 1), date(2021, 2, 1)];
    assert_eq!(
        svc.not_yet_frozen_dates(&candidates, date(2021, 1, 15)),
        vec![date(2021, 1, 1), date(2021, 2, 1)]
    );
    assert_eq!(
        svc.not_yet_frozen_dates(&candidates, date(2021, 1, 2)),
        candidates.to_vec()
    );

    assert!(svc.is_current_date_valid(date(2021, 1, 15)));
    assert!(svc.is_current_date_valid(date(2021, 1, 16)));
    assert!(!svc.is_current_date_valid(date(2021, 1, 17)));
}
