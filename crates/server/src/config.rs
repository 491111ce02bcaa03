use std::time::Duration;

use camsync::DEFAULT_PORT;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub tick_interval: Duration,
    pub camera_id: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            tick_interval: Duration::from_millis(32),
            camera_id: 0,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Missing, malformed or zero ports fall back to [`DEFAULT_PORT`].
pub fn resolve_port(raw: Option<&str>) -> u16 {
    match raw.map(|p| p.trim().parse::<u16>()) {
        Some(Ok(port)) if port != 0 => port,
        None => DEFAULT_PORT,
        Some(_) => {
            log::warn!(
                "Invalid port {:?}, using default {}",
                raw.unwrap_or_default(),
                DEFAULT_PORT
            );
            DEFAULT_PORT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_fallbacks() {
        assert_eq!(resolve_port(Some("5000")), 5000);
        assert_eq!(resolve_port(Some(" 6001 ")), 6001);
        assert_eq!(resolve_port(None), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("not-a-port")), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("70000")), DEFAULT_PORT);
        assert_eq!(resolve_port(Some("0")), DEFAULT_PORT);
    }

    #[test]
    fn default_bind_addr() {
        assert_eq!(ServerConfig::default().bind_addr(), "0.0.0.0:42511");
    }
}
