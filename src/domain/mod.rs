mod analytics;
mod money;
mod transaction;

pub use analytics::*;
pub use money::*;
pub use transaction::*;
