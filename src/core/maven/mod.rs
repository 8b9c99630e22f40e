mod artifact;
pub mod version;

pub use artifact::MavenArtifact;
pub use version::{compare_versions, ComparableVersion};

/// Well-known Maven repositories used by Minecraft ecosystem.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net";
pub const FORGE_MAVEN: &str = "https://maven.minecraftforge.net";
pub const FABRIC_MAVEN: &str = "https://maven.fabricmc.net";
pub const QUILT_MAVEN: &str = "https://maven.quiltmc.org/repository/release";
pub const NEOFORGE_MAVEN: &str = "https://maven.neoforged.net/releases";

const ORGANISATION_REPOSITORIES: [(&str, &str); 4] = [
    ("net.minecraftforge", FORGE_MAVEN),
    ("net.fabricmc", FABRIC_MAVEN),
    ("org.quiltmc", QUILT_MAVEN),
    ("net.neoforged", NEOFORGE_MAVEN),
];

/// Repository base for a group id. Unrecognised organisations fall back to the
/// Mojang library repository.
pub fn repository_for_group(group_id: &str) -> &'static str {
    ORGANISATION_REPOSITORIES
        .iter()
        .find(|(org, _)| {
            group_id == *org
                || group_id
                    .strip_prefix(org)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
        .map(|(_, repo)| *repo)
        .unwrap_or(MOJANG_LIBRARIES)
}
