//! Pass-through relay of still images.

pub(crate) mod stream;
