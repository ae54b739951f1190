pub mod macros;
pub mod options;
pub mod survey;

pub use options::*;
pub use survey::*;
