mod object;
mod store;

pub use object::*;
pub use store::*;
