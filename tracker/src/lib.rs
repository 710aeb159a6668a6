// Data core of the school attendance tracker
pub mod backend;
