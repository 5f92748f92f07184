//! Domain, error and wire types shared by the search core and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
