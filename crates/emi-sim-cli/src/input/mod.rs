pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Deserialise a document from `path` if given, else from piped stdin.
pub fn read_document<T: DeserializeOwned>(
    path: Option<&str>,
    missing: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_input(path)
    } else if let Some(data) = stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(missing.into())
    }
}
