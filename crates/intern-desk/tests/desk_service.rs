use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use intern_desk::service::DeskService;
use intern_desk::store::{JsonFileStore, MemoryStore, StateStore, StoreError};
use intern_desk::workflows::accounts;
use intern_desk::workflows::approval::{self, Acknowledgements, ApprovalProof};
use intern_desk::workflows::{
    absence, ledger, DeskError, EntryDraft, EntryType, LedgerSummary, PolicyBlock, State,
    VacationStatus,
};

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

struct Seeded {
    state: State,
    super_id: String,
    intern_user_id: String,
    intern_id: String,
}

fn seeded() -> Seeded {
    let now = at(2024, 1, 1);
    let mut state = State::default();
    let root = accounts::bootstrap_super(&mut state, "Root", now).expect("bootstrap");
    let ctx = intern_desk::workflows::ActionContext::new(root.clone(), now);
    let (user, intern) = accounts::create_intern(&mut state, &ctx, "Ivo Intern").expect("intern");
    Seeded {
        state,
        super_id: root.id,
        intern_user_id: user.id,
        intern_id: intern.id,
    }
}

/// Memory store whose writes can be switched off.
struct FlakyStore {
    inner: MemoryStore,
    fail_saves: AtomicBool,
}

impl StateStore for FlakyStore {
    fn load(&self) -> Result<State, StoreError> {
        self.inner.load()
    }

    fn save(&self, state: &State) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk detached".to_string()));
        }
        self.inner.save(state)
    }
}

fn entry(entry_type: EntryType, hours: f64, compensated: bool) -> EntryDraft {
    EntryDraft {
        date: date(2024, 1, 2),
        entry_type,
        hours,
        reason: "ajuste".to_string(),
        compensated,
    }
}

#[test]
fn ledger_summary_through_the_service() {
    let seeded = seeded();
    let service = DeskService::new(Arc::new(MemoryStore::new(seeded.state)));
    let intern_id = seeded.intern_id.clone();

    for draft in [
        entry(EntryType::Bank, 8.0, false),
        entry(EntryType::Negative, 3.0, false),
        entry(EntryType::Negative, 2.0, true),
    ] {
        service
            .execute(&seeded.super_id, at(2024, 1, 3), "create_entry", |state, ctx| {
                ledger::create_entry(state, ctx, &intern_id, draft)
            })
            .expect("entry created");
    }

    assert_eq!(
        service.summary(&intern_id).expect("summary"),
        LedgerSummary {
            bank: 8.0,
            negative: 3.0,
            net: 5.0,
        }
    );
}

#[test]
fn failed_operation_is_not_saved() {
    let seeded = seeded();
    let store = Arc::new(MemoryStore::new(seeded.state.clone()));
    let service = DeskService::new(Arc::clone(&store));
    let intern_id = seeded.intern_id.clone();

    let result = service.execute(
        &seeded.intern_user_id,
        at(2024, 1, 1),
        "create_prova",
        |state, ctx| absence::request_exam_leave(state, ctx, &intern_id, date(2024, 1, 3), None),
    );

    assert!(matches!(
        result,
        Err(DeskError::Blocked(PolicyBlock::ExamLeaveWindow { .. }))
    ));
    assert_eq!(store.load().expect("load"), seeded.state);
}

#[test]
fn persistence_failure_surfaces_and_keeps_previous_state() {
    let seeded = seeded();
    let store = Arc::new(FlakyStore {
        inner: MemoryStore::new(seeded.state.clone()),
        fail_saves: AtomicBool::new(true),
    });
    let service = DeskService::new(Arc::clone(&store));
    let intern_id = seeded.intern_id.clone();

    let result = service.execute(&seeded.super_id, at(2024, 1, 3), "create_entry", |state, ctx| {
        ledger::create_entry(state, ctx, &intern_id, entry(EntryType::Bank, 4.0, false))
    });

    assert!(matches!(result, Err(DeskError::Persistence(_))));
    assert_eq!(result.map(|_| ()).unwrap_err().category(), "persistence");
    assert_eq!(store.load().expect("load"), seeded.state);

    store.fail_saves.store(false, Ordering::SeqCst);
    service
        .execute(&seeded.super_id, at(2024, 1, 3), "create_entry", |state, ctx| {
            ledger::create_entry(state, ctx, &intern_id, entry(EntryType::Bank, 4.0, false))
        })
        .expect("retry succeeds");
    assert_eq!(service.summary(&intern_id).expect("summary").bank, 4.0);
}

#[test]
fn unknown_actor_is_rejected_before_running() {
    let seeded = seeded();
    let service = DeskService::new(Arc::new(MemoryStore::new(seeded.state)));
    let mut ran = false;

    let result = service.execute("ghost", at(2024, 1, 3), "noop", |_, _| {
        ran = true;
        Ok(())
    });

    assert!(matches!(result, Err(DeskError::NotFound { .. })));
    assert!(!ran);
}

#[test]
fn vacation_lifecycle_survives_a_file_store() {
    let dir = std::env::temp_dir().join(format!("intern-desk-lifecycle-{}", std::process::id()));
    let path = dir.join("state.json");
    let seeded = seeded();
    JsonFileStore::new(&path)
        .save(&seeded.state)
        .expect("seed written");

    let service = DeskService::new(Arc::new(JsonFileStore::new(&path)));
    let intern_id = seeded.intern_id.clone();

    let request = service
        .execute(
            &seeded.intern_user_id,
            at(2024, 1, 1),
            "create_vacation",
            |state, ctx| absence::request_vacation(state, ctx, &intern_id, date(2024, 6, 3), 10),
        )
        .expect("requested");

    let proof = ApprovalProof::confirm(Acknowledgements {
        first: true,
        second: true,
    })
    .expect("proof");
    service
        .execute(&seeded.super_id, at(2024, 1, 2), "approve_vacation", |state, ctx| {
            approval::approve_vacation(state, ctx, &intern_id, &request.id, proof)
        })
        .expect("approved");

    let reopened = JsonFileStore::new(&path).load().expect("reload");
    let stored = &reopened.intern(&intern_id).expect("intern").vacations[0];
    assert_eq!(stored.status, VacationStatus::Approved);
    assert_eq!(stored.decided_by.as_deref(), Some("Root"));
    assert_eq!(stored.dates.len(), 10);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn sweep_through_the_service_purges_expired_items() {
    let seeded = seeded();
    let service = DeskService::new(Arc::new(MemoryStore::new(seeded.state)));
    let intern_user_id = seeded.intern_user_id.clone();

    let item = service
        .execute(&seeded.super_id, at(2024, 1, 1), "delete_user", |state, ctx| {
            intern_desk::workflows::retention::delete_user(state, ctx, &intern_user_id)
        })
        .expect("deleted");

    assert!(service
        .sweep_trash(date(2024, 1, 11))
        .expect("sweep")
        .is_empty());
    assert_eq!(
        service.sweep_trash(date(2024, 1, 12)).expect("sweep"),
        vec![item.id]
    );
    assert!(service.snapshot().expect("snapshot").trash.is_empty());
}
