pub mod reorder;
pub mod store;
pub mod traits;

pub use reorder::apply_reorder;
pub use store::*;
pub use traits::*;
