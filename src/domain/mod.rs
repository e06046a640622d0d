mod meter;
mod report;

pub use meter::Meter;
pub use report::Report;
