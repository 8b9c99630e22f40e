pub mod arguments;
pub mod libraries;
pub mod locator;
pub mod manifest;
pub mod platform;
pub mod resolved;
pub mod resolver;

pub use arguments::{select_game_arguments, select_jvm_arguments, GameArguments};
pub use libraries::{classify_libraries, LibraryFile, LibrarySet, NativeFile, NativeSet};
pub use locator::VersionLocator;
pub use manifest::{
    rules_allow, AssetIndexInfo, ExtractRule, JavaVersionInfo, LibraryEntry, RawVersionManifest,
    Rule, RuleAction,
};
pub use platform::{OsName, Platform};
pub use resolved::ResolvedVersion;
pub use resolver::{DirectoryManifestSource, ManifestSource, MemoryManifestSource, VersionResolver};
