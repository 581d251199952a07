/// Port the standalone binary listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5000;

/// Initial contents of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seed {
    /// Start with the built-in sample students.
    Sample,
    /// Start with no students at all.
    Empty,
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub seed: Seed,
    pub port: Option<u16>,
    pub host: String,
}

impl RegistryConfig {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            port: None,
            host: "127.0.0.1".to_string(),
        }
    }

    pub fn seeded() -> Self {
        Self::new(Seed::Sample)
    }

    pub fn empty() -> Self {
        Self::new(Seed::Empty)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub(crate) fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port.unwrap_or(0))
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::seeded()
    }
}
