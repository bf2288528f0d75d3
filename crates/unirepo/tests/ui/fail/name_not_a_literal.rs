use unirepo::entity;

#[entity(name = Person)]
pub struct Person {
    pub id: u64,
    pub name: String,
}

fn main() {}
