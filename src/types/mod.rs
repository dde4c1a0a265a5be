// Noise Control shared type definitions
// Each submodule defines types used across the prober, registry and sidebar contexts.

pub mod errors;
pub mod indicator;
pub mod protocol;
pub mod settings;
pub mod tab;
