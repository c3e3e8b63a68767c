pub mod magics;
pub mod movegen;
pub mod tables;
