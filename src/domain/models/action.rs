#[derive(Debug)]
pub enum Action {
    Generate(),
}
