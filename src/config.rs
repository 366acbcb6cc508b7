//! Site configuration.
//!
//! Everything a page boot needs beyond the document itself: the two field
//! presets, the carousels to mount, where the shared fragments live and the
//! dev server used for redirects and the remediation link. Every field has a
//! default, so an empty JSON object is a valid config.
//!
//! ```
//! use constellation::config::SiteConfig;
//!
//! let config: SiteConfig = serde_json::from_str(r#"{ "dev_server": "http://localhost:8080" }"#).unwrap();
//! assert_eq!(config.sliders.len(), 3);
//! assert!(config.validate().is_ok());
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::carousel::CarouselOptions;
use crate::error::ConfigError;
use crate::field::{FieldConfig, Variant};
use crate::loader::DEV_SERVER;

/// A carousel to mount at boot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderSpec {
    /// Id of the element containing the `.slider-track`.
    pub container_id: String,
    #[serde(default)]
    pub options: CarouselOptions,
}

impl SliderSpec {
    pub fn new(container_id: impl Into<String>, options: CarouselOptions) -> Self {
        Self {
            container_id: container_id.into(),
            options,
        }
    }
}

/// A fragment and the placeholder it is injected into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentSlot {
    pub target_id: String,
    pub path: String,
}

impl FragmentSlot {
    pub fn new(target_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            path: path.into(),
        }
    }
}

/// The shared fragments loaded on every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    pub navbar: FragmentSlot,
    pub footer: FragmentSlot,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            navbar: FragmentSlot::new("navbar-placeholder", "components/navbar.html"),
            footer: FragmentSlot::new("footer-placeholder", "components/footer.html"),
        }
    }
}

/// Top-level site configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub constellation: FieldConfig,
    pub tech_grid: FieldConfig,
    pub sliders: Vec<SliderSpec>,
    pub fragments: FragmentConfig,
    pub dev_server: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            constellation: FieldConfig::constellation(),
            tech_grid: FieldConfig::tech_grid(),
            sliders: default_sliders(),
            fragments: FragmentConfig::default(),
            dev_server: DEV_SERVER.to_string(),
        }
    }
}

fn default_sliders() -> Vec<SliderSpec> {
    let year = CarouselOptions {
        interval: 4000,
        slide_width: 280.0,
        gap: 24.0,
        auto_rotate: false,
    };
    vec![
        SliderSpec::new(
            "alumni-slider",
            CarouselOptions {
                interval: 2000,
                slide_width: 320.0,
                gap: 24.0,
                auto_rotate: true,
            },
        ),
        SliderSpec::new("slider-2024", year),
        SliderSpec::new("slider-2023", year),
    ]
}

impl SiteConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SiteConfig = serde_json::from_str(&text)?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// The field configuration for a variant.
    pub fn field(&self, variant: Variant) -> &FieldConfig {
        match variant {
            Variant::Constellation => &self.constellation,
            Variant::TechGrid => &self.tech_grid,
        }
    }

    /// The dev server as a URL.
    pub fn dev_server_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.dev_server)
            .map_err(|e| ConfigError::Invalid(format!("dev_server {:?}: {}", self.dev_server, e)))
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.constellation.validate()?;
        self.tech_grid.validate()?;

        for slider in &self.sliders {
            if slider.container_id.is_empty() {
                return Err(ConfigError::Invalid("slider container_id is empty".into()));
            }
            let options = &slider.options;
            if options.interval == 0 {
                return Err(ConfigError::Invalid(format!(
                    "slider #{}: interval must be positive",
                    slider.container_id
                )));
            }
            if !(options.slide_width > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "slider #{}: slide_width must be positive",
                    slider.container_id
                )));
            }
            if options.gap < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "slider #{}: gap must not be negative",
                    slider.container_id
                )));
            }
        }

        for slot in [&self.fragments.navbar, &self.fragments.footer] {
            if slot.target_id.is_empty() || slot.path.is_empty() {
                return Err(ConfigError::Invalid(format!("incomplete fragment slot {:?}", slot)));
            }
        }

        self.dev_server_url()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::Rgba;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sliders[0].container_id, "alumni-slider");
        assert_eq!(config.sliders[0].options.interval, 2000);
        assert!(!config.sliders[1].options.auto_rotate);
        assert_eq!(config.fragments.navbar.path, "components/navbar.html");
        assert_eq!(config.field(Variant::TechGrid).particle_count, 80);
    }

    #[test]
    fn test_empty_object_is_default() {
        let config: SiteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "constellation": { "particle_count": 20, "tint": { "kind": "fixed", "color": "rgba(0, 128, 255, 0.5)" } },
            "sliders": [ { "container_id": "team", "options": { "interval": 1500, "slideWidth": 200 } } ]
        }"#;
        let config: SiteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.constellation.particle_count, 20);
        assert_eq!(config.constellation.tint.base(), Rgba::new(0, 128, 255, 0.5));
        assert_eq!(config.constellation.connection_distance, 120.0);
        assert_eq!(config.sliders.len(), 1);
        assert_eq!(config.sliders[0].options.slide_width, 200.0);
        assert_eq!(config.sliders[0].options.gap, 24.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects() {
        let mut config = SiteConfig::default();
        config.sliders[0].options.interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SiteConfig::default();
        config.sliders[2].options.slide_width = 0.0;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.dev_server = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.tech_grid.connection_distance = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        fs::write(&path, r#"{ "dev_server": "http://127.0.0.1:4000" }"#).unwrap();
        let config = SiteConfig::load(&path).unwrap();
        assert_eq!(config.dev_server_url().unwrap().port(), Some(4000));

        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(SiteConfig::load(&path), Err(ConfigError::Parse(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(SiteConfig::load(&missing), Err(ConfigError::Io { .. })));
    }
}
