pub mod model;
pub mod registry;

pub use model::{LauncherProfile, LauncherProfiles, LauncherVersion};
pub use registry::{ProfileRegistry, PROFILES_FILE};
