//! URL helpers for talking to the backend

/// Backend port, see `[server] port` in config.toml
const BACKEND_PORT: u16 = 3000;

/// Base URL of the backend built from the current window location,
/// e.g. "http://localhost:3000". Empty when there is no window.
pub fn api_base() -> String {
    let window = match web_sys::window() {
        Some(w) => w,
        None => return String::new(),
    };
    let location = window.location();
    let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
    let hostname = location
        .hostname()
        .unwrap_or_else(|_| "127.0.0.1".to_string());
    base_url(&protocol, &hostname)
}

fn base_url(protocol: &str, hostname: &str) -> String {
    format!("{}//{}:{}", protocol, hostname, BACKEND_PORT)
}

/// Full API URL from a path starting with "/api/"
///
/// ```rust,ignore
/// let url = api_url("/api/d402/dashboard");
/// ```
pub fn api_url(path: &str) -> String {
    format!("{}{}", api_base(), path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("http:", "localhost"), "http://localhost:3000");
        assert_eq!(base_url("https:", "example.com"), "https://example.com:3000");
    }
}
