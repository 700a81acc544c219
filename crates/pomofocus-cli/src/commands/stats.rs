use clap::Subcommand;
use pomofocus_core::ChartView;
use serde_json::json;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum StatsAction {
    /// All-time totals and the current daily streak
    Summary,
    /// Today's focus minutes by hour
    Today,
    /// This week's focus minutes by day
    Week,
    /// Task completion counts and productivity score
    Tasks,
}

pub fn run(action: StatsAction, ctx: &Context) -> CmdResult {
    let app = ctx.open();

    match action {
        StatsAction::Summary => {
            let summary = app.summary();
            print_json(&json!({
                "totalSessions": summary.total_sessions,
                "totalFocusMinutes": summary.total_focus_minutes(),
                "totalBreakMinutes": summary.total_break_secs / 60,
                "todaySessions": summary.today_sessions,
                "todayFocusMinutes": summary.today_focus_secs / 60,
                "productivityScore": summary.productivity_score,
                "dailyStreak": app.streak(),
            }))?;
        }
        StatsAction::Today => print_json(&app.chart(ChartView::Daily))?,
        StatsAction::Week => print_json(&app.chart(ChartView::Weekly))?,
        StatsAction::Tasks => {
            let summary = app.summary();
            print_json(&json!({
                "total": summary.total_tasks,
                "completed": summary.completed_tasks,
                "active": summary.active_tasks,
                "productivityScore": summary.productivity_score,
            }))?;
        }
    }
    Ok(())
}
