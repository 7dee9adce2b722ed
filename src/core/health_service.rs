/// Static process identity. Deliberately does not probe the queue transport.
#[derive(Clone, Debug)]
pub struct HealthService {
    service: String,
    version: String,
}

impl HealthService {
    #[must_use]
    pub const fn new(service: String, version: String) -> Self {
        Self { service, version }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}
