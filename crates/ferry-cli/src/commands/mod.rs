//! CLI command implementations

pub(crate) mod common;
pub(crate) mod down;
pub(crate) mod reset;
pub(crate) mod up;
pub(crate) mod version;

#[cfg(test)]
pub(crate) mod test_support;
