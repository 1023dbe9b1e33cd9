use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// `EnvFilter` directive for the crate at this level.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Error => "tagdoc=error",
            Self::Warn => "tagdoc=warn",
            Self::Info => "tagdoc=info",
            Self::Debug => "tagdoc=debug",
            Self::Trace => "tagdoc=trace",
        }
    }
}

/// The `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
}
