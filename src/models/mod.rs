pub mod energy;
pub mod finance;
pub mod weather;
