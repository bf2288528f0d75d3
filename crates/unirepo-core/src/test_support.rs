use crate::{
    db::{Session, store::MemoryStore},
    key::MetadataCache,
    types::{Timestamp, Ulid},
};
use std::sync::Arc;
use unirepo_derive::entity;

#[entity(path = "test::Person", name = "Person", primary_key = id)]
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TestPerson {
    pub(crate) id: Ulid,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) date_of_birth: Timestamp,
    pub(crate) email: Option<String>,
    pub(crate) phone_number: Option<String>,
}

#[entity(path = "test::UserRole", name = "UserRole", primary_key = [user_id, role_id])]
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TestUserRole {
    pub(crate) user_id: Ulid,
    pub(crate) role_id: i32,
    pub(crate) role_name: String,
}

/// No declared key: resolved from a registration or the store's model.
#[entity(path = "test::Setting", name = "Setting")]
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TestSetting {
    pub(crate) code: String,
    pub(crate) value: String,
}

#[entity(path = "test::Ticket", name = "Ticket", primary_key = id)]
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct TestTicket {
    pub(crate) id: u64,
    pub(crate) title: String,
    pub(crate) score: f64,
}

/// Projection target; declares no key and is never stored.
#[entity(path = "test::PersonCard", name = "PersonCard")]
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct PersonCard {
    pub(crate) first_name: String,
    pub(crate) email: Option<String>,
    pub(crate) nickname: String,
}

pub(crate) fn ulid(n: u128) -> Ulid {
    Ulid::from(n)
}

pub(crate) fn person(n: u128, first: &str, last: &str) -> TestPerson {
    TestPerson {
        id: ulid(n),
        first_name: first.to_string(),
        last_name: last.to_string(),
        date_of_birth: Timestamp::from_seconds(631_152_000),
        email: Some(format!("{}@example.com", first.to_ascii_lowercase())),
        phone_number: None,
    }
}

pub(crate) fn user_role(user: u128, role_id: i32, role_name: &str) -> TestUserRole {
    TestUserRole {
        user_id: ulid(user),
        role_id,
        role_name: role_name.to_string(),
    }
}

pub(crate) fn session() -> Session<MemoryStore> {
    Session::new(MemoryStore::new(), Arc::new(MetadataCache::new()))
}
