//! Fully-qualified board names.
//!
//! An FQBN has the form `package:arch:board[:key=value,key=value]`, e.g.
//! `arduino:avr:nano:cpu=atmega328old`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::properties::PropertyMap;

/// A parsed fully-qualified board name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fqbn {
    /// Package (vendor) name, e.g. `arduino`
    pub package: String,

    /// Platform architecture, e.g. `avr`
    pub platform_arch: String,

    /// Board id within the platform, e.g. `uno`
    pub board_id: String,

    /// Board options, in the order they were given
    pub configs: PropertyMap,
}

/// Error returned when parsing a malformed FQBN.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FqbnParseError {
    #[error("invalid fqbn `{0}`: expected package:arch:board[:options]")]
    WrongComponentCount(String),

    #[error("invalid fqbn `{0}`: empty component")]
    EmptyComponent(String),

    #[error("invalid fqbn `{fqbn}`: malformed board option `{option}`")]
    MalformedOption { fqbn: String, option: String },
}

impl Fqbn {
    /// Create an FQBN without board options.
    pub fn new(
        package: impl Into<String>,
        platform_arch: impl Into<String>,
        board_id: impl Into<String>,
    ) -> Self {
        Fqbn {
            package: package.into(),
            platform_arch: platform_arch.into(),
            board_id: board_id.into(),
            configs: PropertyMap::new(),
        }
    }

    /// Add a board option.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configs.set(key, value);
        self
    }

    /// Copy of this FQBN with the board options removed.
    pub fn without_configs(&self) -> Fqbn {
        let mut plain = self.clone();
        plain.configs.clear();
        plain
    }

    /// Filesystem-safe suffix for exported artifact names.
    ///
    /// Board options are dropped and `:` becomes `.`, so
    /// `arduino:avr:uno:cpu=x` yields `arduino.avr.uno`.
    pub fn filename_suffix(&self) -> String {
        self.without_configs().to_string().replace(':', ".")
    }
}

impl fmt::Display for Fqbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.package, self.platform_arch, self.board_id)?;
        if !self.configs.is_empty() {
            let options: Vec<String> = self
                .configs
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            write!(f, ":{}", options.join(","))?;
        }
        Ok(())
    }
}

impl FromStr for Fqbn {
    type Err = FqbnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (package, arch, board, options) = match parts.as_slice() {
            [package, arch, board] => (*package, *arch, *board, None),
            [package, arch, board, options] => (*package, *arch, *board, Some(*options)),
            _ => return Err(FqbnParseError::WrongComponentCount(s.to_string())),
        };

        if package.is_empty() || arch.is_empty() || board.is_empty() {
            return Err(FqbnParseError::EmptyComponent(s.to_string()));
        }

        let mut fqbn = Fqbn::new(package, arch, board);
        if let Some(options) = options {
            for option in options.split(',') {
                match option.split_once('=') {
                    Some((key, value)) if !key.is_empty() => fqbn.configs.set(key, value),
                    _ => {
                        return Err(FqbnParseError::MalformedOption {
                            fqbn: s.to_string(),
                            option: option.to_string(),
                        })
                    }
                }
            }
        }

        Ok(fqbn)
    }
}
