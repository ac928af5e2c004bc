//! Calendar route handlers.
//!
//! A month grid of the principal's deadlines. Weeks start on Monday;
//! leading and trailing cells pad the grid to full weeks.

use std::collections::BTreeMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use chrono::{Datelike, NaiveDate, Utc};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::session::CurrentUser;
use crate::routes::tasks::TaskView;
use crate::services::tasks::TaskService;
use crate::state::AppState;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One cell of the month grid; `day` is `None` for padding cells.
#[derive(Debug, Clone, Default)]
pub struct CalendarCell {
    pub day: Option<u32>,
    pub tasks: Vec<TaskView>,
}

/// Calendar page template.
#[derive(Template, WebTemplate)]
#[template(path = "calendar.html")]
pub struct CalendarTemplate {
    pub user_name: String,
    pub year: i32,
    pub month_name: &'static str,
    pub weeks: Vec<Vec<CalendarCell>>,
    pub prev_href: String,
    pub next_href: String,
}

/// Display the current month.
///
/// # Route
///
/// `GET /calendar`
pub async fn current_month(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<CalendarTemplate, AppError> {
    let today = Utc::now().date_naive();
    render_month(&state, &user, today.year(), today.month()).await
}

/// Display a specific month.
///
/// # Route
///
/// `GET /calendar/{year}/{month}`
pub async fn month(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<CalendarTemplate, AppError> {
    render_month(&state, &user, year, month).await
}

async fn render_month(
    state: &AppState,
    user: &CurrentUser,
    year: i32,
    month: u32,
) -> Result<CalendarTemplate, AppError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::BadRequest(format!("invalid month: {year}-{month}")))?;

    let tasks = TaskService::new(state.pool())
        .calendar_month(user.id, year, month)
        .await?;

    // Group by day of month
    let mut by_day: BTreeMap<u32, Vec<TaskView>> = BTreeMap::new();
    for task in tasks {
        if let Some(deadline) = task.deadline {
            by_day
                .entry(deadline.day())
                .or_default()
                .push(TaskView::from_task(task));
        }
    }

    // Build the grid: leading padding, the days, trailing padding
    let leading = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<CalendarCell> = Vec::with_capacity(42);
    cells.resize_with(leading, CalendarCell::default);
    for day in 1..=days_in_month(first) {
        cells.push(CalendarCell {
            day: Some(day),
            tasks: by_day.remove(&day).unwrap_or_default(),
        });
    }
    while cells.len() % 7 != 0 {
        cells.push(CalendarCell::default());
    }

    let weeks = cells.chunks(7).map(<[CalendarCell]>::to_vec).collect();

    let (prev_year, prev_month) = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };

    Ok(CalendarTemplate {
        user_name: user.display().to_owned(),
        year,
        month_name: MONTH_NAMES.get(month as usize - 1).copied().unwrap_or(""),
        weeks,
        prev_href: format!("/calendar/{prev_year}/{prev_month}"),
        next_href: format!("/calendar/{next_year}/{next_month}"),
    })
}

/// Number of days in the month containing `first` (which must be day 1).
fn days_in_month(first: NaiveDate) -> u32 {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map_or(31, |next| (next - first).num_days().unsigned_abs() as u32)
}
