pub mod randomness;
pub mod types;
pub mod vrf;
