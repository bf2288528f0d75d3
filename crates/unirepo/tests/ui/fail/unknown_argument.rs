use unirepo::entity;

#[entity(table = "people")]
pub struct Person {
    pub id: u64,
    pub name: String,
}

fn main() {}
