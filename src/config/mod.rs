use serde::Deserialize;
use std::path::PathBuf;

use crate::io::OutputStyle;

/// Settings for rebuilding land from coastline and clipping regions to it
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombineConfig {
    /// Region polygons to clip
    pub regions: PathBuf,
    /// Coastline linework the land polygon is rebuilt from
    pub coastline: PathBuf,
    pub output: PathBuf,
    pub style: OutputStyle,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            regions: PathBuf::from("prefectures_filtered.geojson"),
            coastline: PathBuf::from("coastline_filtered.geojson"),
            output: PathBuf::from("prefectures_land_only.geojson"),
            style: OutputStyle::Compact,
        }
    }
}

/// Settings for exploding, filtering and gap-closing polygons
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Smallest part kept, in square meters of `metric_crs`
    pub min_area: f64,
    /// Grow-then-shrink distance, in meters of `metric_crs`
    pub buffer_distance: f64,
    /// EPSG code areas and buffers are computed in
    pub metric_crs: u32,
    /// EPSG code written out
    pub geographic_crs: u32,
    pub style: OutputStyle,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("prefectures_land_only_clean.geojson"),
            output: PathBuf::from("prefectures_land_only_closed.geojson"),
            min_area: 10_000_000.0,
            buffer_distance: 0.5,
            metric_crs: 3857,
            geographic_crs: 4326,
            style: OutputStyle::Compact,
        }
    }
}

/// Settings for stripping feature properties
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReduceConfig {
    pub input: PathBuf,
    /// Defaults to `<input stem>_filtered.geojson` next to the input
    pub output: Option<PathBuf>,
    /// Property keys that survive
    pub keep: Vec<String>,
    pub style: OutputStyle,
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("coastline.geojson"),
            output: None,
            keep: vec!["id".to_string()],
            style: OutputStyle::Pretty,
        }
    }
}

impl ReduceConfig {
    pub fn output_path(&self) -> PathBuf {
        if let Some(ref output) = self.output {
            return output.clone();
        }
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.input.with_file_name(format!("{}_filtered.geojson", stem))
    }
}

/// Contents of a `landclip.toml` file; every table is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub combine: CombineConfig,
    #[serde(default)]
    pub cleanup: CleanupConfig,
    #[serde(default)]
    pub reduce: ReduceConfig,
}

impl FileConfig {
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        log::warn!("Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("landclip.toml"));
    paths.push(PathBuf::from(".landclip.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("landclip").join("config.toml"));
        paths.push(config_dir.join("landclip.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".landclip.toml"));
    }

    paths
}
