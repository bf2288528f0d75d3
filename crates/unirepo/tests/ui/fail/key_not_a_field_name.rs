use unirepo::entity;

#[entity(primary_key = "id")]
pub struct Person {
    pub id: u64,
    pub name: String,
}

fn main() {}
