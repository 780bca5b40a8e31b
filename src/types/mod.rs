pub mod gate;
pub mod market;

pub use gate::*;
pub use market::*;
