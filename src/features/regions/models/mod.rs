mod admin_unit;
mod province;

pub use admin_unit::{AdminUnit, UpsertAdminUnit};
pub use province::{Province, UpsertProvince};
