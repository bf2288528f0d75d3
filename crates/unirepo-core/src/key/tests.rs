use super::*;
use crate::{
    db::store::MemoryStore,
    error::{RepoError, SchemaError},
    test_support::{TestPerson, TestSetting, TestTicket, TestUserRole, person, ulid},
    traits::Path,
    value::Value,
};
use std::{sync::Arc, thread};

#[test]
fn declared_composite_key_resolves_in_declared_order() {
    let cache = MetadataCache::new();
    let desc = cache
        .resolve::<TestUserRole, _>(&MemoryStore::new())
        .expect("declared key should resolve");

    assert!(desc.is_composite());
    assert_eq!(desc.arity(), 2);
    assert_eq!(desc.field_names().collect::<Vec<_>>(), ["user_id", "role_id"]);
    assert_eq!(desc.entity_path, TestUserRole::PATH);
}

#[test]
fn second_resolve_is_a_cache_hit_returning_the_same_descriptor() {
    let cache = MetadataCache::new();
    let store = MemoryStore::new();

    let (first, hit_first) = cache.resolve_traced::<TestPerson, _>(&store).unwrap();
    let (second, hit_second) = cache.resolve_traced::<TestPerson, _>(&store).unwrap();

    assert!(!hit_first);
    assert!(hit_second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    assert!(cache.contains::<TestPerson>());
}

#[test]
fn undeclared_key_without_any_source_is_a_schema_error() {
    let cache = MetadataCache::new();
    let err = cache
        .resolve::<TestSetting, _>(&MemoryStore::new())
        .expect_err("no key source exists");

    assert!(matches!(
        err,
        RepoError::Schema(SchemaError::MissingPrimaryKey { entity: "Setting" })
    ));
    assert_eq!(err.to_string(), "no primary key for type Setting");
    // failures are not cached
    assert!(cache.is_empty());
}

#[test]
fn store_model_supplies_key_for_undeclared_entity() {
    let cache = MetadataCache::new();
    let store = MemoryStore::new().with_primary_key(TestSetting::PATH, &["code"]);

    let desc = cache.resolve::<TestSetting, _>(&store).unwrap();

    assert_eq!(desc.field_names().collect::<Vec<_>>(), ["code"]);
    assert!(!desc.is_composite());
}

#[test]
fn registration_wins_over_store_model() {
    let cache = MetadataCache::new();
    let store = MemoryStore::new().with_primary_key(TestSetting::PATH, &["code"]);

    cache.register::<TestSetting>(&["value"]).unwrap();
    let desc = cache.resolve::<TestSetting, _>(&store).unwrap();

    assert_eq!(desc.field_names().collect::<Vec<_>>(), ["value"]);
}

#[test]
fn conflicting_registration_is_rejected() {
    let cache = MetadataCache::new();

    cache.register::<TestSetting>(&["code"]).unwrap();
    cache
        .register::<TestSetting>(&["code"])
        .expect("same shape again is a no-op");

    let err = cache.register::<TestSetting>(&["value"]).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Schema(SchemaError::ConflictingRegistration { .. })
    ));

    // contradicting an already resolved declared key
    cache.resolve::<TestPerson, _>(&MemoryStore::new()).unwrap();
    assert!(cache.register::<TestPerson>(&["email"]).is_err());
}

#[test]
fn declared_key_cannot_be_overridden_by_registration() {
    let cache = MetadataCache::new();

    // nothing resolved yet, the declared key still wins
    let err = cache.register::<TestPerson>(&["email"]).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Schema(SchemaError::ConflictingRegistration { entity: "Person" })
    ));
    cache
        .register::<TestPerson>(&["id"])
        .expect("restating the declared key is allowed");

    let desc = cache.resolve::<TestPerson, _>(&MemoryStore::new()).unwrap();
    assert_eq!(desc.field_names().collect::<Vec<_>>(), ["id"]);
}

#[test]
fn registration_racing_first_resolution_stays_consistent() {
    for _ in 0..64 {
        let cache = Arc::new(MetadataCache::new());

        let registrar = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.register::<TestSetting>(&["value"]))
        };
        let resolver = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let store = MemoryStore::new().with_primary_key(TestSetting::PATH, &["code"]);
                cache.resolve::<TestSetting, _>(&store)
            })
        };

        let registered = registrar.join().expect("register thread panicked");
        let resolved = resolver.join().expect("resolve thread panicked").unwrap();
        let names: Vec<_> = resolved.field_names().collect();

        // either the registration landed first and was used, or it lost
        // to the store model and was rejected
        match registered {
            Ok(()) => assert_eq!(names, ["value"]),
            Err(err) => {
                assert!(matches!(
                    err,
                    RepoError::Schema(SchemaError::ConflictingRegistration { .. })
                ));
                assert_eq!(names, ["code"]);
            }
        }
    }
}

#[test]
fn unknown_and_unkeyable_key_fields_are_schema_errors() {
    let cache = MetadataCache::new();

    let err = cache.register::<TestSetting>(&["missing"]).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Schema(SchemaError::UnknownKeyField { .. })
    ));

    let err = cache.register::<TestTicket>(&["score"]).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Schema(SchemaError::UnkeyableField {
            kind: "float64",
            ..
        })
    ));
}

#[test]
fn concurrent_first_resolution_publishes_one_descriptor() {
    let cache = Arc::new(MetadataCache::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                (0..50)
                    .map(|_| {
                        cache
                            .resolve::<TestUserRole, _>(&MemoryStore::new())
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let all: Vec<Arc<KeyDescriptor>> = handles
        .into_iter()
        .flat_map(|h| h.join().expect("resolver thread panicked"))
        .collect();

    let first = &all[0];
    assert!(all.iter().all(|d| Arc::ptr_eq(d, first) && **d == **first));
    assert_eq!(cache.len(), 1);
}

#[test]
fn convert_single_is_strict_about_variants() {
    let desc = MetadataCache::new()
        .resolve::<TestPerson, _>(&MemoryStore::new())
        .unwrap();

    let key = desc.convert_single(&Value::Ulid(ulid(7))).unwrap();
    assert_eq!(key, StorageKey::single(ulid(7)));

    let err = desc
        .convert_single(&Value::Text(ulid(7).to_string()))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::KeyTypeMismatch {
            expected: "ulid",
            found: "text",
            ..
        }
    ));
}

#[test]
fn integer_keys_convert_losslessly_across_signedness() {
    let desc = MetadataCache::new()
        .resolve::<TestTicket, _>(&MemoryStore::new())
        .unwrap();

    assert_eq!(
        desc.convert_single(&Value::Int(5)).unwrap(),
        StorageKey::single(5u64)
    );
    assert!(desc.convert_single(&Value::Int(-1)).is_err());
}

#[test]
fn integer_keys_respect_the_field_width() {
    let desc = MetadataCache::new()
        .resolve::<TestUserRole, _>(&MemoryStore::new())
        .unwrap();

    assert_eq!(desc.convert(1, &Value::Uint(7)).unwrap(), Key::Int(7));

    let err = desc.convert(1, &Value::Int(1 << 40)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::KeyTypeMismatch {
            field: "role_id",
            expected: "i32",
            found: "int",
            ..
        }
    ));
}

#[test]
fn convert_past_the_last_key_field_is_an_arity_mismatch() {
    let desc = MetadataCache::new()
        .resolve::<TestPerson, _>(&MemoryStore::new())
        .unwrap();

    let err = desc.convert(5, &Value::Int(1)).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ArityMismatch {
            expected: 1,
            found: 6,
            ..
        }
    ));
}

#[test]
fn single_value_against_composite_key_is_an_arity_mismatch() {
    let desc = MetadataCache::new()
        .resolve::<TestUserRole, _>(&MemoryStore::new())
        .unwrap();

    let err = desc.convert_single(&Value::Ulid(ulid(1))).unwrap_err();
    assert!(matches!(
        err,
        RepoError::ArityMismatch {
            expected: 2,
            found: 1,
            ..
        }
    ));
}

#[test]
fn key_of_rejects_null_key_fields() {
    let cache = MetadataCache::new();
    let store = MemoryStore::new().with_primary_key(TestSetting::PATH, &["code"]);
    let desc = cache.resolve::<TestSetting, _>(&store).unwrap();

    let key = desc
        .key_of(&TestSetting {
            code: "theme".into(),
            value: "dark".into(),
        })
        .unwrap();
    assert_eq!(key.to_string(), "('theme')");

    let person_desc = cache.resolve::<TestPerson, _>(&store).unwrap();
    assert_eq!(
        person_desc.key_of(&person(3, "Jane", "Doe")).unwrap(),
        StorageKey::single(ulid(3))
    );
}

#[test]
fn id_value_shapes() {
    assert!(IdValue::from(Value::from_list([1i64, 2])).is_composite());
    assert!(IdValue::from(vec![Value::Int(1)]).is_composite());
    assert!(!IdValue::from(42u64).is_composite());
    assert!(IdValue::from(Value::Null).is_null());
    assert_eq!(IdValue::composite([1i64, 2]).values().len(), 2);

    let key = StorageKey::new(vec![Key::Ulid(ulid(1)), Key::Int(4)]);
    assert_eq!(
        key.to_id(),
        IdValue::Composite(vec![Value::Ulid(ulid(1)), Value::Int(4)])
    );
}
