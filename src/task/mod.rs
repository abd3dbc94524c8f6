//! Task implementations, one per timing domain plus reporting and operator input
pub mod drive;
pub mod edge_decode;
pub mod operator;
pub mod report;
pub mod sample;
