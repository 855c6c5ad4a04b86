pub mod bridge;
pub mod dense;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod similarity;
pub mod sparse;
pub mod svd;
mod utils;

pub use error::AlgebraError;
pub use error::AlgebraResult;
pub use utils::FloatOps;
