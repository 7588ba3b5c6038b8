pub(crate) mod memory;
pub(crate) mod render;
pub(crate) mod source;
