pub mod analyzer;
pub(crate) mod capture_loop;
pub(crate) mod shared;
