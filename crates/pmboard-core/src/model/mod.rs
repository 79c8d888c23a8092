mod project;
mod task;
pub mod time;
mod user;
#[cfg(test)]
mod tests;

pub use project::*;
pub use task::*;
pub use user::*;
