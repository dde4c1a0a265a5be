// Noise Control UI layer
// Pure rendering of chrome indicators and the sidebar view model.

pub mod indicator_render;
pub mod sidebar_view;
