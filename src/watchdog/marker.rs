//! The synthetic record written to probe the consensus write path.

/// Loopback address the marker claims to live on.
pub const MARKER_IP: &str = "localhost";
/// Port nothing real listens on, so the marker is easy to spot.
pub const MARKER_PORT: u16 = 52520;
/// Service name the marker is registered under.
pub const MARKER_SERVICE: &str = "test-persistent-instance-server";

/// Identity of the marker instance.
///
/// `ephemeral` is always false: persistent instances are committed through
/// the consensus log, ephemeral ones are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRecord {
    pub ip: String,
    pub port: u16,
    pub service_name: String,
    pub ephemeral: bool,
}

impl Default for MarkerRecord {
    fn default() -> Self {
        Self {
            ip: MARKER_IP.to_string(),
            port: MARKER_PORT,
            service_name: MARKER_SERVICE.to_string(),
            ephemeral: false,
        }
    }
}

impl MarkerRecord {
    /// Query parameters identifying this record on the instance endpoint.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("ip", self.ip.clone()),
            ("port", self.port.to_string()),
            ("serviceName", self.service_name.clone()),
            ("ephemeral", self.ephemeral.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_persistent() {
        let marker = MarkerRecord::default();
        assert!(!marker.ephemeral);
        assert_eq!(
            marker.query_pairs(),
            [
                ("ip", "localhost".to_string()),
                ("port", "52520".to_string()),
                ("serviceName", "test-persistent-instance-server".to_string()),
                ("ephemeral", "false".to_string()),
            ]
        );
    }
}
