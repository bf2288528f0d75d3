use std::{sync::Arc, thread};
use unirepo::{
    MemoryStore, MetadataCache, RepoError, Session,
    error::ErrorClass,
    prelude::*,
};

#[entity(primary_key = id)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Person {
    pub id: Ulid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[entity(primary_key = [user_id, role_id])]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserRole {
    pub user_id: Ulid,
    pub role_id: i32,
    pub granted_by: String,
}

fn session() -> Session<MemoryStore> {
    Session::new(MemoryStore::new(), Arc::new(MetadataCache::new()))
}

fn jane() -> Person {
    Person {
        id: Ulid::from(1u128),
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: Some("jane@example.com".into()),
    }
}

#[test]
fn jane_becomes_janet() {
    let db = session();
    let people = db.repository::<Person>();

    let id = people.create(jane()).expect("create jane");
    let loaded = people
        .get_by_id(id.clone(), ReadMode::Readonly)
        .expect("get jane")
        .expect("jane exists");
    assert_eq!(loaded.entity(), &jane());

    let patch = Person {
        first_name: "Janet".into(),
        ..jane()
    };
    people.patch(&patch).expect("patch first name");

    let janet = people
        .get_by_id(id, ReadMode::Readonly)
        .expect("get janet")
        .expect("janet exists");
    assert_eq!(janet.first_name, "Janet");
    assert_eq!(janet.last_name, "Doe");
}

#[test]
fn composite_key_lookup_and_wrong_arity() {
    let db = session();
    let roles = db.repository::<UserRole>();
    let user = Ulid::from(42u128);

    roles
        .create(UserRole {
            user_id: user,
            role_id: 7,
            granted_by: "root".into(),
        })
        .expect("create role");

    let found = roles
        .get_by_composite_id(&[Value::Ulid(user), Value::Int(7)], ReadMode::Readonly)
        .expect("lookup")
        .expect("row exists");
    assert_eq!(found.granted_by, "root");

    let err = roles
        .get_by_composite_id(&[Value::Ulid(user)], ReadMode::Readonly)
        .expect_err("one value for a two-field key");
    assert!(matches!(
        err,
        RepoError::ArityMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
    assert_eq!(err.class(), ErrorClass::Argument);
}

#[test]
fn patch_of_missing_row_fails_and_changes_nothing() {
    let db = session();
    let people = db.repository::<Person>();

    let err = people.patch(&jane()).expect_err("nothing to patch");

    assert!(err.is_not_found());
    assert_eq!(err.class(), ErrorClass::NotFound);
    assert!(db.with_store(MemoryStore::is_empty));
}

#[test]
fn delete_asserts_prior_existence() {
    let db = session();
    let people = db.repository::<Person>();
    let id = IdValue::from(Ulid::from(1u128));

    assert!(people.delete(id.clone()).expect_err("absent").is_not_found());

    people.create(jane()).expect("create jane");
    people.delete(id.clone()).expect("delete jane");
    assert!(people.get(id).expect("get after delete").is_none());
}

#[test]
fn default_entity_path_and_name_come_from_the_struct() {
    let desc = session()
        .repository::<UserRole>()
        .descriptor()
        .expect("declared key resolves");

    assert_eq!(desc.entity_name, "UserRole");
    assert!(desc.entity_path.ends_with("::UserRole"));
    assert_eq!(desc.field_names().collect::<Vec<_>>(), ["user_id", "role_id"]);
}

#[test]
fn predicates_filter_queries() {
    let db = session();
    let people = db.repository::<Person>();
    people.create(jane()).expect("create jane");
    people
        .create(Person {
            id: Ulid::from(2u128),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: None,
        })
        .expect("create john");

    let without_email = people
        .query_collection(|q| {
            q.filter_by(&Predicate::is_null("email"))
                .map(|p| p.first_name)
        })
        .expect("query");

    assert_eq!(without_email, ["John"]);
}

#[test]
fn concurrent_sessions_resolve_one_descriptor() {
    let cache = Arc::new(MetadataCache::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let db = Session::new(MemoryStore::new(), cache);
                (0..25)
                    .map(|_| db.repository::<UserRole>().descriptor().expect("resolve"))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let descriptors: Vec<_> = handles
        .into_iter()
        .flat_map(|handle| handle.join().expect("thread panicked"))
        .collect();

    assert_eq!(descriptors.len(), 100);
    assert!(
        descriptors
            .iter()
            .all(|d| Arc::ptr_eq(d, &descriptors[0]))
    );
    assert_eq!(cache.len(), 1);
}
