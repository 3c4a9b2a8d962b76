use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

type InputResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Typed input from `--input <file.json>`, else from piped stdin.
/// `None` when neither was supplied.
pub fn load<T: DeserializeOwned>(path: Option<&str>) -> InputResult<Option<T>> {
    if let Some(path) = path {
        return read_json(path).map(Some);
    }
    match read_stdin()? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Like [`load`], but input is mandatory for `what`.
pub fn require<T: DeserializeOwned>(path: Option<&str>, what: &str) -> InputResult<T> {
    load(path)?.ok_or_else(|| format!("--input <file.json> or stdin required for {what}").into())
}

fn read_json<T: DeserializeOwned>(path: &str) -> InputResult<T> {
    let resolved = resolve_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    let value: T = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", resolved.display(), e))?;
    Ok(value)
}

/// Piped JSON on stdin. `None` for an interactive terminal or empty input.
fn read_stdin() -> InputResult<Option<Value>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(trimmed)?))
}

fn resolve_path(path: &str) -> InputResult<PathBuf> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !resolved.is_file() {
        return Err(format!("Not a readable file: {}", resolved.display()).into());
    }
    Ok(resolved)
}
