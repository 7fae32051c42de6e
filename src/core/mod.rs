//! Core provisioning logic.

pub mod inspect;
pub mod layout;
pub mod provision;
