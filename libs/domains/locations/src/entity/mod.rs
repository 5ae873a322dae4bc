//! Sea-ORM entities for the location tables

pub mod district;
pub mod region;
pub mod street;
pub mod ward;
