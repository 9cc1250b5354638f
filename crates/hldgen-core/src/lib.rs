pub mod bedrock;
pub mod component;
pub mod error;
pub mod generate;
pub mod io;
pub mod maintainers;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod templates;

pub use error::{HldgenError, Result};
pub use generate::Outcome;
pub use report::Reporter;
