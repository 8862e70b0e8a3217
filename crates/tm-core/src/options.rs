//! Generator options and configuration file loading
//!
//! Options are read from a small rc-style file:
//!
//! ```text
//! # tilemaze options
//! OPTIONS=min_walls:24,wall_density:0.12
//! OPTIONS=!fallback
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::consts::*;
use crate::door::MapKind;

/// Options errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Tunables for maze and terrain generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenOptions {
    /// Wall target never drops below this
    pub min_walls: usize,
    /// Wall target as a fraction of the interior area
    pub wall_density: f64,
    /// Fallback cluster is stamped when fewer walls than this were placed
    pub fallback_floor: usize,
    /// Whether the fallback stage runs at all
    pub fallback: bool,
    /// Cells kept clear inward of an opening
    pub clearance_depth: i32,
    /// Distance obstacles keep from the map boundary
    pub safe_margin: i32,
    /// Placement attempts per wall candidate
    pub attempt_factor: usize,
    /// Smallest interior side that is carved
    pub min_interior: i32,
    /// Edge half-width floor on overworld maps
    pub overworld_min_half_width: u32,
    /// Edge half-width floor on building interiors
    pub building_min_half_width: u32,
    /// Upper bound on organic terrain tails
    pub max_tails: u32,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            min_walls: MIN_WALL_TARGET,
            wall_density: WALL_DENSITY,
            fallback_floor: FALLBACK_FLOOR,
            fallback: true,
            clearance_depth: CLEARANCE_DEPTH,
            safe_margin: SAFE_MARGIN,
            attempt_factor: ATTEMPT_FACTOR,
            min_interior: MIN_INTERIOR,
            overworld_min_half_width: OVERWORLD_MIN_HALF_WIDTH,
            building_min_half_width: BUILDING_MIN_HALF_WIDTH,
            max_tails: MAX_TAILS,
        }
    }
}

impl GenOptions {
    /// Load options from a file
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::IoError(e.to_string()))?;

        Self::parse_config(&contents)
    }

    /// Parse options from a config string
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for line in contents.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(opts) = line.strip_prefix("OPTIONS=") {
                for opt in opts.split(',') {
                    let opt = opt.trim();
                    if !opt.is_empty() {
                        options.parse_option(opt)?;
                    }
                }
            }
        }

        Ok(options)
    }

    /// Parse a single option
    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if let Some((key, value)) = opt.split_once(':').or_else(|| opt.split_once('=')) {
            return self.set_option(key.trim(), value.trim());
        }

        let (negated, name) = match opt.strip_prefix('!') {
            Some(name) => (true, name),
            None => (false, opt),
        };
        self.set_bool_option(name, !negated)
    }

    fn set_bool_option(&mut self, name: &str, value: bool) -> Result<(), OptionsError> {
        match name {
            "fallback" => self.fallback = value,
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionsError> {
        let invalid = || OptionsError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };

        match name {
            "min_walls" => self.min_walls = value.parse().map_err(|_| invalid())?,
            "wall_density" => {
                let density: f64 = value.parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&density) {
                    return Err(invalid());
                }
                self.wall_density = density;
            }
            "fallback_floor" => self.fallback_floor = value.parse().map_err(|_| invalid())?,
            "fallback" => self.fallback = parse_bool(value).ok_or_else(invalid)?,
            "clearance_depth" => {
                self.clearance_depth = parse_non_negative(value).ok_or_else(invalid)?
            }
            "safe_margin" => {
                let margin = parse_non_negative(value).ok_or_else(invalid)?;
                if margin < 1 {
                    return Err(invalid());
                }
                self.safe_margin = margin;
            }
            "attempt_factor" => self.attempt_factor = value.parse().map_err(|_| invalid())?,
            "min_interior" => self.min_interior = parse_non_negative(value).ok_or_else(invalid)?,
            "overworld_min_half_width" => {
                self.overworld_min_half_width = value.parse().map_err(|_| invalid())?
            }
            "building_min_half_width" => {
                self.building_min_half_width = value.parse().map_err(|_| invalid())?
            }
            "max_tails" => self.max_tails = value.parse().map_err(|_| invalid())?,
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Save options to a file
    pub fn save_to_file(&self, path: &Path) -> Result<(), OptionsError> {
        std::fs::write(path, self.to_config_string())
            .map_err(|e| OptionsError::IoError(e.to_string()))
    }

    /// Convert options to config file format
    pub fn to_config_string(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# tilemaze generator options".to_string());
        lines.push(String::new());
        lines.push(format!(
            "OPTIONS=min_walls:{},wall_density:{},fallback_floor:{}",
            self.min_walls, self.wall_density, self.fallback_floor
        ));
        lines.push(format!(
            "OPTIONS={}fallback",
            if self.fallback { "" } else { "!" }
        ));
        lines.push(format!(
            "OPTIONS=clearance_depth:{},safe_margin:{},attempt_factor:{},min_interior:{}",
            self.clearance_depth, self.safe_margin, self.attempt_factor, self.min_interior
        ));
        lines.push(format!(
            "OPTIONS=overworld_min_half_width:{},building_min_half_width:{},max_tails:{}",
            self.overworld_min_half_width, self.building_min_half_width, self.max_tails
        ));
        lines.join("\n") + "\n"
    }

    /// Edge half-width floor for a map kind
    pub fn min_half_width(&self, kind: MapKind) -> u32 {
        match kind {
            MapKind::Overworld => self.overworld_min_half_width,
            MapKind::Building => self.building_min_half_width,
        }
    }

    /// Wall-cell target for an interior of the given area
    pub fn wall_target(&self, interior_area: usize) -> usize {
        let scaled = (self.wall_density * interior_area as f64).floor() as usize;
        self.min_walls.max(scaled)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn parse_non_negative(value: &str) -> Option<i32> {
    value.parse::<i32>().ok().filter(|v| *v >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = GenOptions::default();
        assert_eq!(opts.min_walls, 24);
        assert_eq!(opts.fallback_floor, 8);
        assert_eq!(opts.clearance_depth, 2);
        assert!(opts.fallback);
    }

    #[test]
    fn test_wall_target() {
        let opts = GenOptions::default();
        // 20 x 14 interior of a 22 x 16 map
        assert_eq!(opts.wall_target(280), 33);
        assert_eq!(opts.wall_target(100), 24);
        assert_eq!(opts.wall_target(0), 24);
    }

    #[test]
    fn test_min_half_width_by_kind() {
        let opts = GenOptions::default();
        assert_eq!(opts.min_half_width(MapKind::Overworld), 1);
        assert_eq!(opts.min_half_width(MapKind::Building), 0);
    }

    #[test]
    fn test_parse_value_options() {
        let config = "# comment\nOPTIONS=min_walls:30, wall_density=0.2\nOPTIONS=max_tails:1";
        let opts = GenOptions::parse_config(config).unwrap();
        assert_eq!(opts.min_walls, 30);
        assert_eq!(opts.wall_density, 0.2);
        assert_eq!(opts.max_tails, 1);
    }

    #[test]
    fn test_parse_bool_option() {
        let opts = GenOptions::parse_config("OPTIONS=!fallback").unwrap();
        assert!(!opts.fallback);
        let opts = GenOptions::parse_config("OPTIONS=fallback:off").unwrap();
        assert!(!opts.fallback);
        let opts = GenOptions::parse_config("OPTIONS=fallback").unwrap();
        assert!(opts.fallback);
    }

    #[test]
    fn test_unknown_option() {
        let err = GenOptions::parse_config("OPTIONS=walls_please").unwrap_err();
        assert_eq!(err, OptionsError::UnknownOption("walls_please".to_string()));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            GenOptions::parse_config("OPTIONS=wall_density:1.5"),
            Err(OptionsError::InvalidValue { .. })
        ));
        assert!(matches!(
            GenOptions::parse_config("OPTIONS=clearance_depth:-1"),
            Err(OptionsError::InvalidValue { .. })
        ));
        assert!(matches!(
            GenOptions::parse_config("OPTIONS=safe_margin:0"),
            Err(OptionsError::InvalidValue { .. })
        ));
        assert!(matches!(
            GenOptions::parse_config("OPTIONS=min_walls:lots"),
            Err(OptionsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_roundtrip() {
        let mut opts = GenOptions::default();
        opts.min_walls = 12;
        opts.wall_density = 0.25;
        opts.fallback = false;
        opts.building_min_half_width = 2;

        let parsed = GenOptions::parse_config(&opts.to_config_string()).unwrap();
        assert_eq!(parsed, opts);
    }

    #[test]
    fn test_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("tm-options-{}.rc", std::process::id()));
        let mut opts = GenOptions::default();
        opts.safe_margin = 3;
        opts.save_to_file(&path).unwrap();
        let loaded = GenOptions::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, opts);
    }

    #[test]
    fn test_missing_file() {
        let err = GenOptions::load_from_file(Path::new("/nonexistent/tilemaze.rc")).unwrap_err();
        assert!(matches!(err, OptionsError::IoError(_)));
    }
}
