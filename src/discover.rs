use crate::{
    config::Config,
    error::{Error, Result},
};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// One component, identified by the location of its story file.
///
/// The three extractors and the merge step are organized around this
/// unit. Sibling paths are derived by convention: the component
/// definition lives under the components root at the same relative
/// directory, and the documentation file (resolved by the documentation
/// extractor) lives next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryUnit {
    /// The story file that anchors this unit.
    pub story_path: PathBuf,

    /// Expected path of the component definition.
    pub component_path: PathBuf,

    /// Directory expected to contain the component and its documentation.
    pub component_dir: PathBuf,

    /// Component base name (story filename with the suffix stripped).
    pub base_name: String,
}

/// Discovers story files and derives their sibling paths.
pub(crate) struct Discovery {
    stories_dir: PathBuf,
    components_dir: PathBuf,
    story_suffix: String,
    component_suffix: String,
    story_glob: GlobSet,
}

impl Discovery {
    /// Creates a new discovery walker from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the story suffix cannot be compiled into a
    /// glob pattern.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let pattern = format!("**/*{}", config.story_suffix);
        let glob = Glob::new(&pattern)
            .map_err(|e| Error::invalid_pattern(&pattern, e.to_string()))?;

        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let story_glob = builder
            .build()
            .map_err(|e| Error::invalid_pattern(&pattern, e.to_string()))?;

        Ok(Self {
            stories_dir: config.stories_dir.clone(),
            components_dir: config.components_dir.clone(),
            story_suffix: config.story_suffix.clone(),
            component_suffix: config.component_suffix.clone(),
            story_glob,
        })
    }

    /// Enumerates all discovery units under the stories root, recursively.
    ///
    /// Results are sorted by story path for deterministic ordering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoStories`] when no story file matches.
    pub(crate) fn discover(&self) -> Result<Vec<DiscoveryUnit>> {
        debug!("Discovering story files in {}", self.stories_dir.display());

        let mut units = Vec::new();

        let walker = WalkBuilder::new(&self.stories_dir)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .hidden(true)
            .follow_links(false)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walk error: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if !self.story_glob.is_match(path) {
                trace!("Skipping non-story file: {}", path.display());
                continue;
            }

            match self.unit_for(path) {
                Some(unit) => units.push(unit),
                None => warn!(
                    "Could not derive component paths for {}",
                    path.display()
                ),
            }
        }

        if units.is_empty() {
            return Err(Error::no_stories(&self.stories_dir));
        }

        units.sort_by(|a, b| a.story_path.cmp(&b.story_path));

        debug!("Discovered {} story files", units.len());
        Ok(units)
    }

    /// Derives one discovery unit from a story file path.
    fn unit_for(&self, story_path: &Path) -> Option<DiscoveryUnit> {
        let file_name = story_path.file_name()?.to_str()?;
        let base_name = file_name.strip_suffix(self.story_suffix.as_str())?;
        if base_name.is_empty() {
            return None;
        }

        let relative = pathdiff::diff_paths(story_path, &self.stories_dir)?;
        let relative_dir = relative.parent().unwrap_or_else(|| Path::new(""));

        let component_dir = self.components_dir.join(relative_dir);
        let component_path =
            component_dir.join(format!("{}{}", base_name, self.component_suffix));

        Some(DiscoveryUnit {
            story_path: story_path.to_path_buf(),
            component_path,
            component_dir,
            base_name: base_name.to_string(),
        })
    }
}
