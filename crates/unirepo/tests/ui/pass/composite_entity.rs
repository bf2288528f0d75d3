use unirepo::prelude::*;

#[entity(path = "ui::UserRole", name = "UserRole", primary_key = [user_id, role_id])]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserRole {
    pub user_id: Ulid,
    pub role_id: i32,
    pub r#type: String,
}

#[entity(crate = unirepo)]
#[derive(Clone, Debug, Default)]
pub struct Setting {
    pub code: String,
    pub value: String,
}

fn main() {
    assert_eq!(UserRole::PATH, "ui::UserRole");
    assert_eq!(UserRole::MODEL.primary_key, ["user_id", "role_id"]);
    assert!(UserRole::MODEL.field("type").is_some());

    assert!(!Setting::MODEL.declares_key());
    assert!(Setting::PATH.ends_with("::Setting"));
}
