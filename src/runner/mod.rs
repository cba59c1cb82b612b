pub mod aggregate;
pub mod build;
pub mod display;
pub mod execute;
pub mod parse;
pub mod pump;
pub mod report;
pub mod result;
