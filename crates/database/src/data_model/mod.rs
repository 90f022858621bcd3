pub mod capture;
pub mod station;
