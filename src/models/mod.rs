pub mod assessment;
pub mod feedback;

pub use assessment::*;
pub use feedback::*;
