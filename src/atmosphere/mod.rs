//! Atmospheric energy transport on hybrid sigma-pressure model levels.

pub mod correction;
pub mod geopotential;
pub mod hybrid;
pub mod transport;

pub use {
    correction::MassCorrection,
    geopotential::geopotential,
    hybrid::HybridGrid,
    transport::{meridional_energy_transport, AtmosphereFields, AtmosphereTransport},
};
