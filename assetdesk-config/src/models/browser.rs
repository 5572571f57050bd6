use anyhow::Context;
use assetdesk_model::AssetOrder;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Path to a TOML or JSON browser config file.
pub const CONFIG_PATH_ENV: &str = "ASSETDESK_CONFIG_PATH";
/// Inline JSON browser config.
pub const CONFIG_JSON_ENV: &str = "ASSETDESK_CONFIG_JSON";

/// Files looked up under the search root, first match wins.
const PROJECT_FILES: [&str; 4] = [
    "assetdesk.toml",
    "assetdesk.json",
    "config/assetdesk.toml",
    "config/assetdesk.json",
];

/// Source that produced the browser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BrowserConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Text format of a browser config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    /// No usable extension; a document opening with `{` is read as JSON.
    Sniff,
}

impl ConfigFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Sniff,
        }
    }

    fn resolve(self, contents: &str) -> Self {
        match self {
            ConfigFormat::Sniff if contents.trim_start().starts_with('{') => {
                ConfigFormat::Json
            }
            ConfigFormat::Sniff => ConfigFormat::Toml,
            known => known,
        }
    }
}

/// Browser tuning. Every field has a default so partial files are fine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Documents per asset page. A page that comes back shorter than this
    /// marks the collection as exhausted.
    pub page_size: usize,
    /// Server-side ordering of the asset query. Changing it resets the view.
    pub order: AssetOrder,
    /// Whether `drafts.` documents are let through the feed filter.
    pub include_drafts: bool,
    /// Maximum queued feed transitions applied per flush before readers get a
    /// fresh snapshot. Lower values publish more often during bursts.
    pub apply_batch_limit: usize,
    /// Number of deleted asset ids remembered so stale pages cannot bring
    /// them back. The oldest are forgotten first.
    pub tombstone_capacity: usize,
    /// Request page 0 and the tag list as soon as the browser starts.
    pub load_first_page_on_start: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            order: AssetOrder::default(),
            include_drafts: false,
            apply_batch_limit: 256,
            tombstone_capacity: 1_024,
            load_first_page_on_start: true,
        }
    }
}

impl BrowserConfig {
    /// Resolve the process configuration: `$ASSETDESK_CONFIG_PATH`, then
    /// `$ASSETDESK_CONFIG_JSON`, then a project file in the working
    /// directory, then defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, BrowserConfigSource)> {
        Self::load_with(|key| env::var(key).ok(), Path::new("."))
    }

    /// [`BrowserConfig::load_from_env`] with an injected variable lookup and
    /// project root.
    pub fn load_with<F>(
        lookup: F,
        root: &Path,
    ) -> anyhow::Result<(Self, BrowserConfigSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank =
            |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let source = Self::locate(&non_blank, root);
        let config = match &source {
            BrowserConfigSource::Default => Self::default(),
            BrowserConfigSource::EnvPath(path)
            | BrowserConfigSource::File(path) => Self::load_from_file(path)?,
            BrowserConfigSource::EnvInline => {
                let raw = non_blank(CONFIG_JSON_ENV).unwrap_or_default();
                Self::parse(&raw, ConfigFormat::Json).with_context(|| {
                    format!("{CONFIG_JSON_ENV} is not a valid browser config")
                })?
            }
        };

        log::debug!("browser config resolved from {source:?}");
        Ok((config, source))
    }

    /// Pick the winning source without reading any file.
    fn locate(
        non_blank: &dyn Fn(&str) -> Option<String>,
        root: &Path,
    ) -> BrowserConfigSource {
        if let Some(path) = non_blank(CONFIG_PATH_ENV) {
            return BrowserConfigSource::EnvPath(PathBuf::from(path));
        }
        if non_blank(CONFIG_JSON_ENV).is_some() {
            return BrowserConfigSource::EnvInline;
        }
        PROJECT_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|path| path.is_file())
            .map(BrowserConfigSource::File)
            .unwrap_or_default()
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("cannot open browser config {}", path.display())
        })?;
        Self::parse(&contents, ConfigFormat::for_path(path)).with_context(
            || format!("browser config {} is malformed", path.display()),
        )
    }

    pub fn parse(contents: &str, format: ConfigFormat) -> anyhow::Result<Self> {
        let config: Self = match format.resolve(contents) {
            ConfigFormat::Json => serde_json::from_str(contents)?,
            _ => toml::from_str(contents)?,
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(
        vars: &'a HashMap<&'static str, String>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_configured() {
        let dir = tempfile::tempdir().unwrap();
        let vars = HashMap::new();
        let (config, source) =
            BrowserConfig::load_with(lookup(&vars), dir.path()).unwrap();
        assert_eq!(config, BrowserConfig::default());
        assert_eq!(source, BrowserConfigSource::Default);
    }

    #[test]
    fn inline_json_overrides_defaults_partially() {
        let dir = tempfile::tempdir().unwrap();
        let mut vars = HashMap::new();
        vars.insert(
            CONFIG_JSON_ENV,
            r#"{"page_size": 10, "order": "filename_asc"}"#.to_string(),
        );
        let (config, source) =
            BrowserConfig::load_with(lookup(&vars), dir.path()).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.order, AssetOrder::FilenameAsc);
        assert_eq!(config.apply_batch_limit, 256);
        assert_eq!(config.tombstone_capacity, 1_024);
        assert_eq!(source, BrowserConfigSource::EnvInline);
    }

    #[test]
    fn blank_variables_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("assetdesk.toml"), "page_size = 12\n")
            .unwrap();
        let mut vars = HashMap::new();
        vars.insert(CONFIG_PATH_ENV, "  ".to_string());
        vars.insert(CONFIG_JSON_ENV, String::new());

        let (config, source) =
            BrowserConfig::load_with(lookup(&vars), dir.path()).unwrap();
        assert_eq!(config.page_size, 12);
        assert_eq!(
            source,
            BrowserConfigSource::File(dir.path().join("assetdesk.toml"))
        );
    }

    #[test]
    fn env_path_wins_over_inline_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("browser.toml");
        fs::write(&path, "page_size = 7\ninclude_drafts = true\n").unwrap();

        let mut vars = HashMap::new();
        vars.insert(CONFIG_PATH_ENV, path.display().to_string());
        vars.insert(CONFIG_JSON_ENV, r#"{"page_size": 99}"#.to_string());

        let (config, source) =
            BrowserConfig::load_with(lookup(&vars), dir.path()).unwrap();
        assert_eq!(config.page_size, 7);
        assert!(config.include_drafts);
        assert_eq!(source, BrowserConfigSource::EnvPath(path));
    }

    #[test]
    fn project_file_under_config_dir_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        let path = dir.path().join("config/assetdesk.json");
        fs::write(&path, r#"{"load_first_page_on_start": false}"#).unwrap();

        let vars = HashMap::new();
        let (config, source) =
            BrowserConfig::load_with(lookup(&vars), dir.path()).unwrap();
        assert!(!config.load_first_page_on_start);
        assert_eq!(source, BrowserConfigSource::File(path));
    }

    #[test]
    fn extensionless_files_are_sniffed() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("browser");
        fs::write(&json, r#"{"page_size": 3}"#).unwrap();
        assert_eq!(BrowserConfig::load_from_file(&json).unwrap().page_size, 3);

        let toml = dir.path().join("browser.conf");
        fs::write(&toml, "tombstone_capacity = 64\n").unwrap();
        assert_eq!(
            BrowserConfig::load_from_file(&toml)
                .unwrap()
                .tombstone_capacity,
            64
        );
    }

    #[test]
    fn malformed_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "page_size = [").unwrap();

        let err = BrowserConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
        assert!(err.to_string().contains("malformed"));
    }
}
