//! Locate, parse and validate the configuration file.

use std::{
    env,
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};

use ron::{
    Options,
    extensions::Extensions,
    ser::{PrettyConfig, to_string_pretty},
};
use tracing::debug;

use crate::{Config, Error};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "APPMENU_CONFIG";

/// Resolve the configuration path from the process environment.
///
/// Policy:
/// 1) `$APPMENU_CONFIG` when set.
/// 2) `$XDG_CONFIG_HOME/appmenu/config.ron`.
/// 3) `$HOME/.config/appmenu/config.ron`.
pub fn default_config_path() -> Option<PathBuf> {
    config_path_from(|key| env::var_os(key))
}

/// [`default_config_path`] over an arbitrary variable lookup.
pub fn config_path_from(var: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());
    if let Some(explicit) = non_empty(CONFIG_ENV) {
        return Some(PathBuf::from(explicit));
    }
    let base = match non_empty("XDG_CONFIG_HOME") {
        Some(xdg) => PathBuf::from(xdg),
        None => PathBuf::from(non_empty("HOME")?).join(".config"),
    };
    Some(base.join("appmenu").join("config.ron"))
}

/// Load the effective configuration.
///
/// An `explicit` path must exist. Without one, the default path is used when
/// present and built-in defaults otherwise. Returns the path that was read.
pub fn load(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>), Error> {
    if let Some(path) = explicit {
        return Ok((load_from_path(path)?, Some(path.to_path_buf())));
    }
    let Some(path) = default_config_path() else {
        debug!("no config location resolvable; using defaults");
        return Ok((Config::default(), None));
    };
    match fs::read_to_string(&path) {
        Ok(text) => Ok((load_from_str(&text, Some(&path))?, Some(path))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file absent; using defaults");
            Ok((Config::default(), None))
        }
        Err(e) => Err(Error::Read {
            path: Some(path),
            message: e.to_string(),
        }),
    }
}

/// Load a configuration from a RON file at `path`.
pub fn load_from_path(path: &Path) -> Result<Config, Error> {
    let text = fs::read_to_string(path).map_err(|e| Error::Read {
        path: Some(path.to_path_buf()),
        message: e.to_string(),
    })?;
    load_from_str(&text, Some(path))
}

/// Parse and validate configuration text. `path` is only used in errors.
pub fn load_from_str(text: &str, path: Option<&Path>) -> Result<Config, Error> {
    let options = Options::default().with_default_extension(Extensions::IMPLICIT_SOME);
    let config: Config = options.from_str(text).map_err(|e| Error::Parse {
        path: path.map(Path::to_path_buf),
        message: e.to_string(),
    })?;
    validate(&config, path)?;
    Ok(config)
}

/// Reject configurations that would disable selection entirely.
fn validate(config: &Config, path: Option<&Path>) -> Result<(), Error> {
    for (field, value) in config.properties.fields() {
        if value.trim().is_empty() {
            return Err(Error::Validation {
                path: path.map(Path::to_path_buf),
                field,
                message: "window property names must not be empty".to_string(),
            });
        }
    }
    Ok(())
}

/// Render a configuration as pretty RON.
pub fn to_ron(config: &Config) -> Result<String, Error> {
    to_string_pretty(config, PrettyConfig::default()).map_err(|e| {
        Error::Validation {
            path: None,
            field: "config",
            message: e.to_string(),
        }
    })
}
