pub(crate) mod bounds;
pub(crate) mod function;
pub(crate) mod processor;
pub(crate) mod resample;
