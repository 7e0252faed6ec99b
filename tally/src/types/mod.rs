pub mod identifier;
pub mod operation;
pub mod params;
pub mod projection;
