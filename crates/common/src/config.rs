use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Environment variable that overrides the command channel listen address.
pub const BIND_ADDRESS_ENV: &str = "VANTAGE_BIND_ADDRESS";

/// Fixed simulator configuration.
///
/// Every value here is a constant of the simulator; `Default` is the shipped
/// configuration. Only the listen address can be overridden, from the
/// environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub terrain_width: f32,
    pub terrain_depth: f32,
    pub wall_height: f32,
    /// Target frame rate of the scheduler.
    pub frame_rate: u32,
    /// Movement divisor: higher is slower.
    pub velocity: f32,
    /// Look divisor: higher is slower.
    pub sensitivity: f32,
    /// Where the command channel listens.
    pub listen_addr: SocketAddr,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            window_width: 1200,
            window_height: 720,
            fov_degrees: 65.0,
            near: 0.1,
            far: 20.0,
            terrain_width: 10.0,
            terrain_depth: 10.0,
            wall_height: 1.0,
            frame_rate: 60,
            velocity: 20.0,
            sensitivity: 10.0,
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8081),
        }
    }
}

impl SimulatorConfig {
    /// Fixed configuration plus the environment override for the listen address.
    pub fn load_or_default() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var(BIND_ADDRESS_ENV) {
            config.apply_bind_override(&addr);
        }
        config
    }

    fn apply_bind_override(&mut self, raw: &str) {
        match raw.trim().parse::<SocketAddr>() {
            Ok(parsed) => self.listen_addr = parsed,
            Err(_) => {
                tracing::warn!("invalid {BIND_ADDRESS_ENV} '{raw}', using {}", self.listen_addr)
            }
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let c = SimulatorConfig::default();
        assert_eq!((c.window_width, c.window_height), (1200, 720));
        assert_eq!(c.fov_degrees, 65.0);
        assert_eq!((c.terrain_width, c.terrain_depth), (10.0, 10.0));
        assert_eq!(c.frame_rate, 60);
        assert_eq!(c.velocity, 20.0);
        assert_eq!(c.sensitivity, 10.0);
        assert_eq!(c.listen_addr.to_string(), "0.0.0.0:8081");
    }

    #[test]
    fn bind_override_accepts_socket_address() {
        let mut c = SimulatorConfig::default();
        c.apply_bind_override("127.0.0.1:9000");
        assert_eq!(c.listen_addr.to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn bind_override_ignores_garbage() {
        let mut c = SimulatorConfig::default();
        c.apply_bind_override("not-an-address");
        assert_eq!(c.listen_addr, SimulatorConfig::default().listen_addr);
    }

    #[test]
    fn aspect_ratio_of_window() {
        let c = SimulatorConfig::default();
        assert!((c.aspect_ratio() - 1200.0 / 720.0).abs() < 1e-6);
    }
}
