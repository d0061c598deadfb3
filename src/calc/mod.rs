pub mod refinance;
pub mod tax;
