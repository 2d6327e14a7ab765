//! Server configuration from command line arguments and the environment.

use algoviz_engine::{Algorithm, EngineConfig, Error, Result};

pub const DEFAULT_PORT: u16 = 3000;

/// Everything the binary needs to start serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisConfig {
    pub algorithm: Algorithm,
    pub port: u16,
    pub engine: EngineConfig,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::BubbleSort,
            port: DEFAULT_PORT,
            engine: EngineConfig::default(),
        }
    }
}

impl VisConfig {
    /// `[algorithm] [port]` positional arguments (program name excluded),
    /// engine settings from the environment.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        Self::from_parts(args, EngineConfig::from_env()?)
    }

    fn from_parts<I>(args: I, engine: EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut config = Self {
            engine,
            ..Self::default()
        };
        if let Some(id) = args.next() {
            config.algorithm = id.parse()?;
        }
        if let Some(raw) = args.next() {
            config.port = raw
                .parse()
                .map_err(|_| Error::InvalidConfig(format!("{raw:?} is not a valid port")))?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<VisConfig> {
        VisConfig::from_parts(args.iter().map(|s| s.to_string()), EngineConfig::default())
    }

    #[test]
    fn defaults_without_arguments() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.algorithm, Algorithm::BubbleSort);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn positional_arguments() {
        let config = parse(&["dijkstra", "8080"]).unwrap();
        assert_eq!(config.algorithm, Algorithm::Dijkstra);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn bad_arguments_are_errors() {
        assert!(matches!(parse(&["timsort"]), Err(Error::UnknownAlgorithm(_))));
        assert!(matches!(parse(&["bst", "http"]), Err(Error::InvalidConfig(_))));
    }
}
