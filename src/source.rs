use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, info};

use crate::models::RawPosting;

const LISTING_KEY: &str = "채용공고목록";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Posting document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Expected a posting array or an object with '채용공고목록', found {0}")]
    UnexpectedShape(&'static str),
}

/// Where the scraped posting document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            Source::Url(input.to_string())
        } else {
            Source::File(PathBuf::from(input))
        }
    }

    pub fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "gongo") {
            proj_dirs.data_dir().join("jobs.json")
        } else {
            PathBuf::from("jobs.json")
        }
    }

    pub fn load(&self) -> Result<Vec<RawPosting>, LoadError> {
        let body = match self {
            Source::File(path) => {
                debug!(path = %path.display(), "Reading posting document");
                std::fs::read_to_string(path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?
            }
            Source::Url(url) => fetch(url)?,
        };
        let postings = parse_document(&body)?;
        info!(postings = postings.len(), source = %self, "Loaded posting document");
        Ok(postings)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

fn fetch(url: &str) -> Result<String, LoadError> {
    debug!(url, "Fetching posting document");
    let http = |source| LoadError::Http {
        url: url.to_string(),
        source,
    };
    let response = reqwest::blocking::get(url).map_err(http)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(http)
}

/// Accepts the flat top-level array as well as the detail-page document,
/// which wraps the array in an object under `채용공고목록`.
pub fn parse_document(body: &str) -> Result<Vec<RawPosting>, LoadError> {
    let document: Value = serde_json::from_str(body)?;
    let list = match document {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(LISTING_KEY) {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(LoadError::UnexpectedShape("a non-array listing")),
            None => return Err(LoadError::UnexpectedShape("an object")),
        },
        Value::Null => return Err(LoadError::UnexpectedShape("null")),
        Value::Bool(_) => return Err(LoadError::UnexpectedShape("a boolean")),
        Value::Number(_) => return Err(LoadError::UnexpectedShape("a number")),
        Value::String(_) => return Err(LoadError::UnexpectedShape("a string")),
    };
    Ok(list.into_iter().map(RawPosting).collect())
}
