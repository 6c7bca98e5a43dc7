pub mod import;
pub mod lead;
pub mod salesperson;
