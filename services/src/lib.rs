pub mod uploads;
pub mod uuid;
