use unirepo::entity;

#[entity(primary_key = id)]
pub struct Pair(u64, String);

fn main() {}
