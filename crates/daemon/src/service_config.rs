use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the API server binds to.
    pub api_listen_addr: SocketAddr,
    /// Directory holding the JSON documents.
    pub data_dir: PathBuf,
    /// Static device-id -> shared-secret table. A request is accepted
    /// when its Authorization header contains any of these secrets.
    pub device_keys: BTreeMap<String, String>,
}
