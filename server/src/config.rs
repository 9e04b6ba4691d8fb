use anyhow::Context;
use scancore::math::Origin;
use scancore::prelude::{MAX_SCANS, RSSI_HISTORY_CAPACITY};
use scancore::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
    pub buffer_capacity: usize,
    pub history_capacity: usize,
    pub origin: Origin,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("public"),
            buffer_capacity: MAX_SCANS,
            history_capacity: RSSI_HISTORY_CAPACITY,
            origin: Origin::default(),
        }
    }
}

/// Command-line values that take precedence over the YAML file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind: Option<IpAddr>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
    pub origin_lat: Option<f64>,
    pub origin_lng: Option<f64>,
    pub origin_name: Option<String>,
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading server config {}", path_ref.display()))?;
        let config: ServerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing server config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(bind) = overrides.bind {
            self.bind = bind;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(static_dir) = overrides.static_dir {
            self.static_dir = static_dir;
        }
        if let Some(lat) = overrides.origin_lat {
            self.origin.lat = lat;
        }
        if let Some(lng) = overrides.origin_lng {
            self.origin.lng = lng;
        }
        if let Some(name) = overrides.origin_name {
            self.origin.name = name;
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            buffer_capacity: self.buffer_capacity,
            history_capacity: self.history_capacity,
            origin: self.origin.clone(),
        }
    }
}
