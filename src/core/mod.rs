// ─── Launchpad Core ───
// Version resolution and parallel downloads for a Minecraft launcher.
//
// Architecture:
//   core/
//     config/     — Launcher settings + download tuning
//     maven/      — Coordinates, repositories, version ordering
//     version/    — Manifests, platform rules, inheritance resolution
//     profile/    — launcher_profiles.json registry
//     downloader/ — Probed, chunked and pooled HTTP downloads
//     natives/    — Native archive extraction

pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod maven;
pub mod natives;
pub mod profile;
pub mod version;
