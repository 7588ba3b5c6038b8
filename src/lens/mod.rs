pub(crate) mod fisheye;
pub(crate) mod model;
pub(crate) mod params;
pub(crate) mod poly3;
pub(crate) mod standard;
