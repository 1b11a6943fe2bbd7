//! Work metadata resolution and still/animated classification.

pub(crate) mod classify;
pub(crate) mod pixiv;
pub(crate) mod resolver;
