//! Startup configuration, read from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::ClassCatalog;
use crate::error::{Result, TaggerError};
use crate::export::ExportStyle;
use crate::surface::SurfaceSettings;

pub const CONFIG_ENV: &str = "VISUAL_TAGGER_CONFIG";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Marker radius: screen pixels on the canvas, image pixels on export.
    pub edit_radius: f64,
    pub stroke_width: f32,
    pub classes: ClassCatalog,
    pub title_color: [u8; 3],
    pub title_scale: f32,
    pub title_origin: [i32; 2],
    pub font_path: Option<PathBuf>,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            edit_radius: 20.0,
            stroke_width: 3.0,
            classes: ClassCatalog::default(),
            title_color: [255, 255, 0],
            title_scale: 48.0,
            title_origin: [20, 20],
            font_path: None,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| TaggerError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let config: Config = serde_json::from_str(&data).map_err(|e| TaggerError::Config {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        config.validate()?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Explicit path first, then `$VISUAL_TAGGER_CONFIG`, then defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_path(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(TaggerError::InvalidConfig(msg));
        if !(self.edit_radius.is_finite() && self.edit_radius > 0.0) {
            return invalid(format!("edit_radius must be positive, got {}", self.edit_radius));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return invalid(format!(
                "stroke_width must be positive, got {}",
                self.stroke_width
            ));
        }
        if !(self.title_scale.is_finite() && self.title_scale > 0.0) {
            return invalid(format!(
                "title_scale must be positive, got {}",
                self.title_scale
            ));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom && self.max_zoom.is_finite()) {
            return invalid(format!(
                "zoom range {}..{} is invalid",
                self.min_zoom, self.max_zoom
            ));
        }
        Ok(())
    }

    pub fn surface_settings(&self) -> SurfaceSettings {
        SurfaceSettings {
            edit_radius: self.edit_radius,
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
        }
    }

    pub fn export_style(&self) -> ExportStyle {
        ExportStyle {
            radius: self.edit_radius as f32,
            stroke_width: self.stroke_width,
            title_color: self.title_color,
            title_scale: self.title_scale,
            title_origin: (self.title_origin[0], self.title_origin[1]),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"edit_radius": 12.5, "classes": [{{"name": "Hoja", "rgb": [10, 20, 30]}}]}}"#
        )
        .unwrap();

        let config = Config::from_path(file.path()).unwrap();
        assert_eq!(config.edit_radius, 12.5);
        assert_eq!(config.classes.len(), 1);
        assert_eq!(config.classes.get(0).unwrap().name, "Hoja");
        assert_eq!(config.max_zoom, 10.0);
        assert_eq!(config.export_style().radius, 12.5);
    }

    #[test]
    fn rejects_bad_values() {
        let config = Config {
            edit_radius: 0.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            title_scale: -48.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            title_scale: f32::NAN,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            min_zoom: 5.0,
            max_zoom: 1.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn unknown_fields_and_duplicate_classes_fail() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"radius": 3}}"#).unwrap();
        assert!(Config::from_path(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"classes": [{{"name": "A", "rgb": [0, 0, 0]}}, {{"name": "A", "rgb": [1, 1, 1]}}]}}"#
        )
        .unwrap();
        assert!(Config::from_path(file.path()).is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::from_path(Path::new("/nonexistent/visual-tagger.json")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn explicit_path_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"max_zoom": 4.0}}"#).unwrap();
        let config = Config::resolve(Some(file.path())).unwrap();
        assert_eq!(config.max_zoom, 4.0);
    }
}
