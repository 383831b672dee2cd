use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::workflows::access::{ActionContext, Role};
use crate::workflows::accounts::bootstrap_super;
use crate::workflows::domain::{Intern, PautaRecord, State, User};
use crate::workflows::ledger::EntryDraft;
use crate::workflows::EntryType;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Mid-morning UTC on the given day.
pub(super) fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn draft(entry_type: EntryType, hours: f64) -> EntryDraft {
    EntryDraft {
        date: date(2024, 1, 2),
        entry_type,
        hours,
        reason: "plantão extra".to_string(),
        compensated: false,
    }
}

pub(super) fn pauta(conferencia: NaiveDate, pauta: NaiveDate) -> PautaRecord {
    PautaRecord {
        id: format!("pauta-{conferencia}"),
        data_conferencia: conferencia,
        data_pauta: pauta,
    }
}

/// Super user, one admin with the default template, and two interns with
/// their linked logins.
pub(super) struct Fixture {
    pub(super) state: State,
    pub(super) super_id: String,
    pub(super) admin_id: String,
    pub(super) intern_user_id: String,
    pub(super) intern_id: String,
    pub(super) other_intern_id: String,
}

impl Fixture {
    pub(super) fn ctx(&self, user_id: &str, now: DateTime<Utc>) -> ActionContext {
        ActionContext::resolve(&self.state, user_id, now).expect("actor exists")
    }

    pub(super) fn super_ctx(&self, now: DateTime<Utc>) -> ActionContext {
        self.ctx(&self.super_id, now)
    }

    pub(super) fn admin_ctx(&self, now: DateTime<Utc>) -> ActionContext {
        self.ctx(&self.admin_id, now)
    }

    pub(super) fn intern_ctx(&self, now: DateTime<Utc>) -> ActionContext {
        self.ctx(&self.intern_user_id, now)
    }

    pub(super) fn intern(&self) -> &Intern {
        self.state.intern(&self.intern_id).expect("intern exists")
    }

    pub(super) fn intern_user(&self) -> &User {
        self.state
            .user(&self.intern_user_id)
            .expect("intern user exists")
    }

    pub(super) fn admin_mut(&mut self) -> &mut User {
        let admin_id = self.admin_id.clone();
        self.state.user_mut(&admin_id).expect("admin exists")
    }
}

fn add_intern(state: &mut State, name: &str, now: DateTime<Utc>) -> (String, String) {
    let intern = Intern::new(name, now);
    let mut user = User::new(name, Role::Intern, now);
    user.intern_id = Some(intern.id.clone());
    let ids = (user.id.clone(), intern.id.clone());
    state.interns.push(intern);
    state.users.push(user);
    ids
}

pub(super) fn fixture() -> Fixture {
    let now = at(2023, 12, 1);
    let mut state = State::default();
    let super_user = bootstrap_super(&mut state, "Root", now).expect("first super user");

    let admin = User::new("Ana Admin", Role::Admin, now);
    let admin_id = admin.id.clone();
    state.users.push(admin);

    let (intern_user_id, intern_id) = add_intern(&mut state, "Ivo Intern", now);
    let (_, other_intern_id) = add_intern(&mut state, "Olga Intern", now);

    Fixture {
        state,
        super_id: super_user.id,
        admin_id,
        intern_user_id,
        intern_id,
        other_intern_id,
    }
}
