//! Command-line interface for the Veda node.

use clap::Parser;
use std::path::PathBuf;

/// The Veda execution-layer node: applies verifier-ordered blocks and serves the
/// Ethereum-dialect read RPC.
#[derive(Debug, Clone, Parser)]
#[command(name = "veda", version, about)]
pub struct VedaArgs {
    /// Root directory for all profiles.
    #[arg(long, env = "XDG_VEDA_ROOT")]
    pub veda_root_dir: Option<PathBuf>,

    /// Data directory of this node. Defaults to `<veda-root-dir>/<profile>`.
    #[arg(long, env = "VEDA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Profile name, used as the suffix of the on-disk layout.
    #[arg(long, default_value = "default")]
    pub profile: String,

    /// Disable the public read RPC server.
    #[arg(long, default_value_t = false)]
    pub disable_rpc: bool,

    /// Listen address of the public read RPC server.
    #[arg(long, default_value = "0.0.0.0")]
    pub http_listen_address: String,

    /// Port of the public read RPC server.
    #[arg(long, default_value_t = 8545)]
    pub http_port: u16,

    /// Comma-separated read-RPC namespaces to enable, or `*` for all.
    #[arg(long, default_value = "*")]
    pub enable_http_apis: String,

    /// Disable the internal sync RPC server. The node then serves reads only.
    #[arg(long, default_value_t = false)]
    pub disable_internal_rpc: bool,

    /// Listen address of the internal sync RPC server.
    #[arg(long, default_value = "127.0.0.1")]
    pub internal_rpc_http_listen_address: String,

    /// Port of the internal sync RPC server.
    #[arg(long, default_value_t = 8679)]
    pub internal_rpc_http_port: u16,

    /// Log verbosity: trace, debug, info, warn, or error.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Database IPC socket path override. Accepted for layout compatibility; the store is
    /// in-process.
    #[arg(long, env = "VEDA_DATABASE_IPC", hide = true)]
    pub database_ipc: Option<PathBuf>,

    /// JSON-RPC IPC socket path override. Accepted for layout compatibility.
    #[arg(long, env = "VEDA_JSONRPC_IPC", hide = true)]
    pub jsonrpc_ipc: Option<PathBuf>,

    /// Gas price reported by `eth_gasPrice`, in wei.
    #[arg(long, env = "VEDA_GAS_PRICE", default_value_t = veda_rpc::DEFAULT_GAS_PRICE)]
    pub gas_price: u128,
}

impl VedaArgs {
    /// The resolved data directory of this profile.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(data_dir) = &self.data_dir {
            return data_dir.clone();
        }
        let root = self.veda_root_dir.clone().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/share/veda")
        });
        root.join(&self.profile)
    }
}

/// On-disk layout under the data directory.
#[derive(Debug, Clone)]
pub struct DataDirLayout {
    /// The key-value store directory.
    pub chain_dir: PathBuf,
    /// The log directory.
    pub logs_dir: PathBuf,
    /// The IPC socket directory, kept for layout compatibility.
    pub ipcs_dir: PathBuf,
    /// The PID file directory, kept for layout compatibility.
    pub pids_dir: PathBuf,
}

impl DataDirLayout {
    /// Builds the layout for `data_dir` with the profile `suffix`, creating the
    /// directories as needed.
    pub fn create(data_dir: &std::path::Path, suffix: &str) -> std::io::Result<Self> {
        let layout = Self {
            chain_dir: data_dir.join(format!("chain-{suffix}")).join("full"),
            logs_dir: data_dir.join(format!("logs-{suffix}")),
            ipcs_dir: data_dir.join(format!("ipcs-{suffix}")),
            pids_dir: data_dir.join(format!("pids-{suffix}")),
        };
        std::fs::create_dir_all(&layout.chain_dir)?;
        std::fs::create_dir_all(&layout.logs_dir)?;
        std::fs::create_dir_all(&layout.ipcs_dir)?;
        std::fs::create_dir_all(&layout.pids_dir)?;
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = VedaArgs::parse_from(["veda"]);
        assert_eq!(args.http_port, 8545);
        assert_eq!(args.internal_rpc_http_port, 8679);
        assert_eq!(args.enable_http_apis, "*");
        assert_eq!(args.profile, "default");
        assert!(!args.disable_rpc);
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let args =
            VedaArgs::parse_from(["veda", "--data-dir", "/tmp/veda-x", "--profile", "p"]);
        assert_eq!(args.resolved_data_dir(), PathBuf::from("/tmp/veda-x"));
    }
}
