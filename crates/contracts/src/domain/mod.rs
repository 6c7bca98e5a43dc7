pub mod import;
pub mod lead;
