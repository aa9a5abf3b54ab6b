//! Physical constants shared by the reanalysis products, and unit scales.

/// Mean Earth radius (m)
pub const EARTH_RADIUS: f64 = 6_371_009.0;
/// Gravitational acceleration (m s-2)
pub const GRAVITY: f64 = 9.806_16;
/// Specific heat of dry air at constant pressure (J kg-1 K-1)
pub const CP_AIR: f64 = 1004.64;
/// Latent heat of vaporisation (J kg-1)
pub const LATENT_HEAT: f64 = 2.501e6;
/// Gas constant of dry air (J kg-1 K-1)
pub const R_DRY: f64 = 287.05;
/// Gas constant of water vapour (J kg-1 K-1)
pub const R_VAPOUR: f64 = 461.5;

/// Reference sea water density (kg m-3)
pub const RHO_SEA: f64 = 1027.0;
/// Specific heat of sea water (J kg-1 K-1)
pub const CP_SEA: f64 = 3987.0;

/// Watts in a terawatt
pub const TERA: f64 = 1.0e12;
/// Watts in a petawatt
pub const PETA: f64 = 1.0e15;
/// One sverdrup (m3 s-1)
pub const SVERDRUP: f64 = 1.0e6;
