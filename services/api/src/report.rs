use crate::infra::{open_desk, FileDesk};
use chrono::{NaiveDate, Utc};
use clap::Args;
use intern_desk::calendar;
use intern_desk::config::AppConfig;
use intern_desk::error::AppError;
use intern_desk::workflows::absence::earliest_exam_leave;
use intern_desk::workflows::audit;
use intern_desk::workflows::retention;
use intern_desk::workflows::{Intern, LedgerSummary, State, VacationStatus};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct SummaryArgs {
    /// Intern id to report on
    #[arg(long)]
    pub(crate) intern: String,
    /// Read this state document instead of the configured one
    #[arg(long)]
    pub(crate) state: Option<PathBuf>,
    /// Evaluation date for windows and retention (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Number of audit records to list
    #[arg(long, default_value_t = 10)]
    pub(crate) history: usize,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SweepArgs {
    /// Operate on this state document instead of the configured one
    #[arg(long)]
    pub(crate) state: Option<PathBuf>,
    /// Evaluation date for retention (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

/// Evaluation day for CLI reports: the override, or the current UTC day the
/// desk rules run on.
pub(crate) fn resolve_today(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| calendar::day_of(Utc::now()))
}

fn desk_for(state_path: Option<PathBuf>) -> Result<FileDesk, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(path) = state_path {
        config.storage.state_path = path;
    }
    Ok(open_desk(&config.storage))
}

pub(crate) fn run_summary(args: SummaryArgs) -> Result<(), AppError> {
    let SummaryArgs {
        intern,
        state,
        today,
        history,
    } = args;

    let desk = desk_for(state)?;
    let today = resolve_today(today);
    let snapshot = desk.snapshot()?;
    let summary = desk.summary(&intern)?;
    let intern = snapshot.intern(&intern)?;

    print!("{}", render_summary(&snapshot, intern, &summary, today, history));
    Ok(())
}

pub(crate) fn run_sweep(args: SweepArgs) -> Result<(), AppError> {
    let desk = desk_for(args.state)?;
    let today = resolve_today(args.today);
    let purged = desk.sweep_trash(today)?;

    println!("Trash sweep for {today}");
    if purged.is_empty() {
        println!("- nothing past retention");
    } else {
        for id in &purged {
            println!("- purged {id}");
        }
    }
    let snapshot = desk.snapshot()?;
    let remaining = retention::restorable_items(&snapshot, today);
    println!("{} item(s) still restorable", remaining.len());
    Ok(())
}

pub(crate) fn render_summary(
    state: &State,
    intern: &Intern,
    summary: &LedgerSummary,
    today: NaiveDate,
    history: usize,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Hours report for {} ({})\n", intern.name, intern.id));
    out.push_str(&format!(
        "- bank {:.2}h | negative {:.2}h | net {:+.2}h\n",
        summary.bank, summary.negative, summary.net
    ));

    let earliest = earliest_exam_leave(today, &state.meta);
    let upcoming: Vec<_> = intern
        .dates
        .iter()
        .filter(|record| record.date >= today)
        .collect();
    out.push_str(&format!(
        "Exam leave: {} upcoming, next bookable date {earliest}\n",
        upcoming.len()
    ));
    for record in upcoming {
        match &record.link {
            Some(link) => out.push_str(&format!("  - {} ({link})\n", record.date)),
            None => out.push_str(&format!("  - {}\n", record.date)),
        }
    }

    out.push_str("Vacations:\n");
    if intern.vacations.is_empty() {
        out.push_str("  - none requested\n");
    }
    for vacation in &intern.vacations {
        let decided = match (&vacation.decided_by, vacation.status) {
            (Some(by), VacationStatus::Approved | VacationStatus::Rejected) => {
                format!(" by {by}")
            }
            _ => String::new(),
        };
        out.push_str(&format!(
            "  - {} to {} ({} days) {}{decided}\n",
            vacation.start_date,
            vacation.end_date(),
            vacation.days,
            vacation.status
        ));
    }

    if let Some(owner) = state
        .users
        .iter()
        .find(|user| user.intern_id.as_deref() == Some(intern.id.as_str()))
    {
        out.push_str(&format!(
            "Unread notifications for {}: {}\n",
            owner.name,
            audit::unread(owner).count()
        ));
    }

    let recent = audit::history(intern, history);
    if !recent.is_empty() {
        out.push_str("Recent activity:\n");
        for entry in recent {
            out.push_str(&format!(
                "  - {} {} ({}): {}\n",
                entry.at.format("%Y-%m-%d %H:%M"),
                entry.by_user_name,
                serde_json::to_value(entry.action)
                    .ok()
                    .and_then(|value| value.as_str().map(str::to_string))
                    .unwrap_or_default(),
                entry.details
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use intern_desk::workflows::{ActionContext, EntryDraft, EntryType, Role, User};
    use intern_desk::workflows::{absence, ledger};

    fn seeded() -> (State, String) {
        let now = Utc
            .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let mut state = State::default();
        let admin = User::new("Ana Admin", Role::Admin, now);
        state.users.push(admin.clone());
        let ctx = ActionContext::new(admin, now);
        let (_, intern) = intern_desk::workflows::accounts::create_intern(&mut state, &ctx, "Ivo")
            .expect("intern created");

        ledger::create_entry(
            &mut state,
            &ctx,
            &intern.id,
            EntryDraft {
                date: NaiveDate::from_ymd_opt(2024, 1, 2).expect("date"),
                entry_type: EntryType::Negative,
                hours: 1.5,
                reason: "consulta".to_string(),
                compensated: false,
            },
        )
        .expect("entry");
        absence::request_vacation(
            &mut state,
            &ctx,
            &intern.id,
            NaiveDate::from_ymd_opt(2024, 7, 1).expect("date"),
            5,
        )
        .expect("vacation");
        (state, intern.id)
    }

    #[test]
    fn default_day_is_the_utc_calendar_day() {
        let pinned = NaiveDate::from_ymd_opt(2024, 2, 29).expect("date");
        assert_eq!(resolve_today(Some(pinned)), pinned);

        let before = calendar::day_of(Utc::now());
        let resolved = resolve_today(None);
        let after = calendar::day_of(Utc::now());
        assert!(resolved == before || resolved == after);
    }

    #[test]
    fn summary_lists_balance_vacations_and_history() {
        let (state, intern_id) = seeded();
        let intern = state.intern(&intern_id).expect("intern");
        let summary = ledger::summarize(intern);
        let today = NaiveDate::from_ymd_opt(2024, 1, 3).expect("date");

        let rendered = render_summary(&state, intern, &summary, today, 5);

        assert!(rendered.contains("net -1.50h"));
        assert!(rendered.contains("next bookable date 2024-01-09"));
        assert!(rendered.contains("2024-07-01 to 2024-07-05 (5 days) pending"));
        assert!(rendered.contains("(create_vacation)"));
        assert!(rendered.contains("Unread notifications for Ivo: 0"));
    }
}
