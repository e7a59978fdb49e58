use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum Error {
    Io { path: PathBuf, source: io::Error },
    Config(toml::de::Error),
    InvalidConfig(String),
    Project(serde_json::Error),
    Track(hound::Error),
    Gui(eframe::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Error::Config(e) => write!(f, "invalid config file: {e}"),
            Error::InvalidConfig(message) => write!(f, "invalid config: {message}"),
            Error::Project(e) => write!(f, "invalid project file: {e}"),
            Error::Track(e) => write!(f, "could not read track: {e}"),
            Error::Gui(e) => write!(f, "gui failed: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Config(e) => Some(e),
            Error::InvalidConfig(_) => None,
            Error::Project(e) => Some(e),
            Error::Track(e) => Some(e),
            Error::Gui(e) => Some(e),
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Project(e)
    }
}

impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Track(e)
    }
}

impl From<eframe::Error> for Error {
    fn from(e: eframe::Error) -> Self {
        Error::Gui(e)
    }
}

pub fn io_error(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Error {
    let path = path.into();
    move |source| Error::Io { path, source }
}
