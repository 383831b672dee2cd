use chrono::{NaiveDate, Utc};
use intern_desk::calendar;
use intern_desk::config::StorageConfig;
use intern_desk::error::AppError;
use intern_desk::service::DeskService;
use intern_desk::store::JsonFileStore;
use intern_desk::workflows::accounts;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type FileDesk = DeskService<JsonFileStore>;

pub(crate) fn open_desk(storage: &StorageConfig) -> FileDesk {
    DeskService::new(Arc::new(JsonFileStore::new(&storage.state_path)))
}

/// Seed the super user the first time the service runs against an empty
/// document.
pub(crate) fn ensure_super_user(desk: &FileDesk, name: &str) -> Result<(), AppError> {
    let now = Utc::now();
    let created = desk.execute_system("bootstrap_super", |state| {
        Ok(accounts::bootstrap_super(state, name, now))
    })?;
    if let Some(user) = created {
        info!(user_id = %user.id, name = %user.name, "super user created");
    }
    Ok(())
}

/// clap value parser over the desk's single date format.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    calendar::parse_date(raw).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_dates_follow_the_desk_format() {
        assert_eq!(
            parse_date(" 2024-03-11 "),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 11).expect("valid date"))
        );
        let err = parse_date("11/03/2024").expect_err("slashes refused");
        assert!(err.contains("11/03/2024"));
    }
}
