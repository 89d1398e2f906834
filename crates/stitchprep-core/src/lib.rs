pub mod consts;
pub mod descriptor;
pub mod error;
pub mod io;
pub mod params;
pub mod pipeline;
pub mod provenance;
pub mod resolution;
pub mod tiles;
