pub(crate) mod fingerprint;
pub(crate) mod tile_cache;
