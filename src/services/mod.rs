// Noise Control services
// Services are the collaborators around the registry: probers, the coordinator task,
// preferences, localization, theming, and the donation reminder.

pub mod donation_reminder;
pub mod localization_engine;
pub mod preference_store;
pub mod registry_service;
pub mod tab_audio_prober;
pub mod theme_engine;
