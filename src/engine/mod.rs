pub mod grid;
pub mod numeric;
pub mod types;
pub mod view;

pub use grid::GridStore;
pub use numeric::RawNumber;
pub use types::*;
