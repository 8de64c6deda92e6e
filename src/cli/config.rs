use std::env;

use anyhow::Context;
use url::Url;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";
pub const SERVER_ENV: &str = "CONTACTBOOK_SERVER";

/// Server URL from the `--server` flag, else `CONTACTBOOK_SERVER`, else the local default
pub fn resolve_server(flag: Option<&str>) -> anyhow::Result<Url> {
    let from_env = env::var(SERVER_ENV).ok();
    let raw = flag
        .map(str::to_owned)
        .or(from_env)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    parse_server(&raw)
}

fn parse_server(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid server URL '{}'", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(anyhow::anyhow!("unsupported server URL scheme '{}'", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins() {
        let url = resolve_server(Some("http://contacts.internal:8080")).unwrap();
        assert_eq!(url.host_str(), Some("contacts.internal"));
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(parse_server("ftp://example.com").is_err());
        assert!(parse_server("not a url").is_err());
        assert!(parse_server(DEFAULT_SERVER).is_ok());
    }
}
