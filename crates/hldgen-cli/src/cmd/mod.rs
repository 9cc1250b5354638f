pub mod hld;
pub mod maintainers;
pub mod project;
pub mod service;
