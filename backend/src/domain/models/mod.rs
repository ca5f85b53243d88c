//! Domain entities for the family tree service.

pub mod member;
pub mod suggestion;
