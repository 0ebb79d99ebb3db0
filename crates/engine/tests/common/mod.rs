#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::PgPool;
use timesheet_core::policy::TimesheetPolicy;
use timesheet_core::save_plan::{DayEfforts, ProjectEfforts, SaveTimesheetsRequest, TaskEffort};
use timesheet_core::types::{DbId, Hours};
use timesheet_db::models::membership::AddMember;
use timesheet_db::models::project::{CreateProject, Project};
use timesheet_db::models::status::TaskOrigin;
use timesheet_db::models::task::{CreateTask, Task};
use timesheet_engine::{FixedClock, TimesheetService};

pub const MANAGER: DbId = 900;
pub const OTHER_MANAGER: DbId = 901;
pub const USER: DbId = 100;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Service with the default policy whose clock reads noon UTC on `today`.
pub fn service(pool: &PgPool, today: NaiveDate) -> TimesheetService {
    service_with(pool, today, TimesheetPolicy::default())
}

pub fn service_with(pool: &PgPool, today: NaiveDate, policy: TimesheetPolicy) -> TimesheetService {
    let noon = today.and_hms_opt(12, 0, 0).unwrap().and_utc();
    TimesheetService::new(pool.clone(), Arc::new(policy)).with_clock(FixedClock(noon))
}

pub struct Seed {
    pub project: Project,
    pub tasks: Vec<Task>,
}

impl Seed {
    pub fn task(&self, index: usize) -> DbId {
        self.tasks[index].id
    }
}

/// Create a project owned by `manager_id`, make `USER` a member and add
/// manager tasks spanning the whole project window.
pub async fn seed_project(
    svc: &TimesheetService,
    manager_id: DbId,
    start: NaiveDate,
    end: NaiveDate,
    task_titles: &[&str],
) -> Seed {
    let project = svc
        .create_project(&CreateProject {
            title: format!("Project {manager_id} {start}"),
            start_date: start,
            end_date: end,
            billable_hours: Some(500),
            non_billable_hours: Some(50),
            manager_id,
        })
        .await
        .unwrap();

    svc.add_member(
        manager_id,
        &AddMember {
            project_id: project.id,
            user_id: USER,
            is_billable: None,
        },
    )
    .await
    .unwrap();

    let mut tasks = Vec::new();
    for title in task_titles {
        let task = svc
            .create_task(
                manager_id,
                TaskOrigin::Manager,
                &CreateTask {
                    project_id: project.id,
                    title: title.to_string(),
                    start_date: start,
                    end_date: end,
                },
            )
            .await
            .unwrap();
        tasks.push(task);
    }

    Seed { project, tasks }
}

/// Project spanning 2021-01-02..=2021-02-10.
pub async fn seed_default(svc: &TimesheetService, task_titles: &[&str]) -> Seed {
    seed_project(svc, MANAGER, date(2021, 1, 2), date(2021, 2, 10), task_titles).await
}

pub fn day(d: NaiveDate, project_id: DbId, tasks: &[(DbId, Hours)]) -> DayEfforts {
    DayEfforts {
        date: d,
        projects: vec![ProjectEfforts {
            project_id,
            tasks: tasks
                .iter()
                .map(|(task_id, hours)| TaskEffort {
                    task_id: *task_id,
                    hours: *hours,
                })
                .collect(),
        }],
    }
}

pub fn request(current_date: NaiveDate, days: Vec<DayEfforts>) -> SaveTimesheetsRequest {
    SaveTimesheetsRequest { current_date, days }
}

pub async fn entry_count(pool: &PgPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM timesheet_entries")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}
