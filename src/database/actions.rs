mod ingredients;
mod recipes;
mod users;

pub use ingredients::*;
pub use recipes::*;
pub use users::*;
