
pub mod atmosphere;
pub mod basin;
pub mod grid;
pub mod ocean;
pub mod partial_cell;

pub mod io;
pub mod pipeline;
pub mod series;

pub mod constants;
pub mod parameters;
pub mod utils;
