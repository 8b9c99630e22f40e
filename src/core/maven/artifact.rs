use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::repository_for_group;
use super::version::ComparableVersion;
use crate::core::error::{LauncherError, LauncherResult};

/// Represents a fully parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version:classifier@packaging`
///   `groupId:artifactId:version@packaging`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension / packaging type. Defaults to `"jar"`.
    pub packaging: String,
}

impl MavenArtifact {
    /// Parse a Maven coordinate string.
    ///
    /// # Examples
    /// ```
    /// use launchpad_lib::core::maven::MavenArtifact;
    ///
    /// let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
    /// assert_eq!(a.group_id, "net.sf.jopt-simple");
    /// ```
    pub fn parse(coord: &str) -> LauncherResult<Self> {
        let coord = coord.trim();

        // Split off @packaging first
        let (coord_part, packaging_override) = match coord.rfind('@') {
            Some(idx) => (&coord[..idx], Some(&coord[idx + 1..])),
            None => (coord, None),
        };

        let parts: Vec<&str> = coord_part.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(LauncherError::InvalidMavenCoordinate(coord.to_string()));
        }

        let packaging = packaging_override
            .filter(|p| !p.is_empty())
            .unwrap_or("jar")
            .to_string();

        match parts.as_slice() {
            [group, artifact, version] => Ok(Self {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                version: version.to_string(),
                classifier: None,
                packaging,
            }),
            [group, artifact, version, classifier] => Ok(Self {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                version: version.to_string(),
                classifier: Some(classifier.to_string()),
                packaging,
            }),
            _ => Err(LauncherError::InvalidMavenCoordinate(coord.to_string())),
        }
    }

    /// Identity used for conflict detection: the coordinate without its
    /// version (`group:artifact[:classifier]`).
    pub fn identity(&self) -> String {
        match &self.classifier {
            Some(c) => format!("{}:{}:{}", self.group_id, self.artifact_id, c),
            None => format!("{}:{}", self.group_id, self.artifact_id),
        }
    }

    pub fn comparable_version(&self) -> ComparableVersion {
        ComparableVersion::new(&self.version)
    }

    /// Return a copy carrying the given classifier.
    pub fn with_classifier(&self, classifier: &str) -> Self {
        let mut clone = self.clone();
        clone.classifier = Some(classifier.to_string());
        clone
    }

    /// Construct the group path portion (`net/sf/jopt-simple`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// Build the artifact filename.
    ///
    /// `artifactId-version[-classifier].packaging`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// Repository-relative path with `/` separators, as used in URLs and
    /// manifest `path` fields.
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }

    /// Construct the full URL for this artifact under the given repository base.
    ///
    /// Template:
    /// `<repo>/<group_path>/<artifact_id>/<version>/<filename>`
    pub fn url(&self, repo_base: &str) -> String {
        let base = repo_base.trim_end_matches('/');
        format!("{}/{}", base, self.relative_path())
    }

    /// URL under the repository that hosts this artifact's organisation.
    pub fn default_url(&self) -> String {
        self.url(repository_for_group(&self.group_id))
    }

    /// Local path relative to the libraries directory.
    ///
    /// Mirrors Maven's local repo layout:
    /// `<group_path>/<artifact_id>/<version>/<filename>`
    pub fn local_path(&self) -> PathBuf {
        self.group_id
            .split('.')
            .fold(PathBuf::new(), |path, segment| path.join(segment))
            .join(&self.artifact_id)
            .join(&self.version)
            .join(self.filename())
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(c) => write!(
                f,
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.version, c
            ),
            None => write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version),
        }?;
        if self.packaging != "jar" {
            write!(f, "@{}", self.packaging)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::maven::{FORGE_MAVEN, MOJANG_LIBRARIES};

    #[test]
    fn parse_simple_coordinate() {
        let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
        assert_eq!(a.group_id, "net.sf.jopt-simple");
        assert_eq!(a.artifact_id, "jopt-simple");
        assert_eq!(a.version, "5.0.4");
        assert_eq!(a.classifier, None);
        assert_eq!(a.packaging, "jar");
    }

    #[test]
    fn parse_with_classifier() {
        let a = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.3:natives-windows").unwrap();
        assert_eq!(a.classifier, Some("natives-windows".to_string()));
        assert_eq!(a.identity(), "org.lwjgl:lwjgl:natives-windows");
    }

    #[test]
    fn parse_with_packaging_override() {
        let a = MavenArtifact::parse("com.example:lib:1.0@zip").unwrap();
        assert_eq!(a.packaging, "zip");
        assert_eq!(a.filename(), "lib-1.0.zip");
        assert_eq!(a.to_string(), "com.example:lib:1.0@zip");
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert!(MavenArtifact::parse("just-a-name").is_err());
        assert!(MavenArtifact::parse("a:b").is_err());
        assert!(MavenArtifact::parse("a::1.0").is_err());
        assert!(MavenArtifact::parse("a:b:c:d:e").is_err());
    }

    #[test]
    fn identity_ignores_version() {
        let old = MavenArtifact::parse("g:a:1.0").unwrap();
        let new = MavenArtifact::parse("g:a:2.0").unwrap();
        assert_eq!(old.identity(), new.identity());
        assert!(new.comparable_version() > old.comparable_version());
    }

    #[test]
    fn url_construction() {
        let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
        let url = a.url("https://libraries.minecraft.net/");
        assert_eq!(
            url,
            "https://libraries.minecraft.net/net/sf/jopt-simple/jopt-simple/5.0.4/jopt-simple-5.0.4.jar"
        );
    }

    #[test]
    fn default_url_uses_organisation_repository() {
        let forge = MavenArtifact::parse("net.minecraftforge:forge:1.12.2-14.23.5.2859").unwrap();
        assert!(forge.default_url().starts_with(FORGE_MAVEN));

        let mojang = MavenArtifact::parse("com.mojang:brigadier:1.0.18").unwrap();
        assert!(mojang.default_url().starts_with(MOJANG_LIBRARIES));
    }

    #[test]
    fn local_path_construction() {
        let a = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.3:natives-windows").unwrap();
        let p = a.local_path();
        assert_eq!(
            p,
            PathBuf::from("org")
                .join("lwjgl")
                .join("lwjgl")
                .join("3.3.3")
                .join("lwjgl-3.3.3-natives-windows.jar")
        );
        assert_eq!(
            a.relative_path(),
            "org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3-natives-windows.jar"
        );
    }
}
