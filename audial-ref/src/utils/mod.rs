//! I/O helpers for the analysis command

pub mod audio_loader;
pub mod track_id;

pub use audio_loader::{load_mono, LoadedAudio};
pub use track_id::local_track_id;
