//! `clap`-derived command-line surfaces for the HotCertification binaries.

use std::path::PathBuf;

use clap::Parser;

/// Flags accepted by `hotcert-server`. Values here override the
/// corresponding field loaded from `--config` when present, mirroring the
/// original's flag-over-file precedence.
#[derive(Debug, Parser)]
#[command(name = "hotcert-server", about = "HotCertification replica")]
pub struct ServerArgs {
    /// This replica's 1-based index; overrides the config file's `id`.
    #[arg(long)]
    pub id: Option<u16>,

    /// Path to the TOML configuration file.
    #[arg(long)]
    pub config: PathBuf,

    /// Path to this replica's threshold key share; overrides the config
    /// file's `thresholdkey`.
    #[arg(long)]
    pub thresholdkey: Option<PathBuf>,

    /// Path to this replica's ECDSA replication private key; overrides
    /// the config file's `privkey`.
    #[arg(long)]
    pub privkey: Option<PathBuf>,
}

/// Flags accepted by `hotcert-keygen`.
#[derive(Debug, Parser)]
#[command(name = "hotcert-keygen", about = "HotCertification trusted-dealer key generator")]
pub struct KeygenArgs {
    /// Number of replicas to generate key shares for (`L`).
    #[arg(long, short = 'n', default_value_t = 4)]
    pub num: u16,

    /// Signing threshold (`K`).
    #[arg(long, short = 't', default_value_t = 3)]
    pub threshold: u16,

    /// RSA modulus size in bits. One of 512/1024/2048/4096.
    #[arg(long, default_value_t = 2048)]
    pub key_size: usize,

    /// Destination directory for the generated key/certificate files.
    pub destination: PathBuf,
}

/// Flags accepted by `hotcert-client`.
#[derive(Debug, Parser)]
#[command(name = "hotcert-client", about = "HotCertification manual/benchmark client")]
pub struct ClientArgs {
    /// Server address to send the request to, `host:port`.
    #[arg(long, default_value = "localhost:9001")]
    pub server_addr: String,

    /// Root CA certificate, used to verify the returned certificate.
    #[arg(long)]
    pub root_ca: Option<PathBuf>,

    /// Common name to request in the generated CSR's subject.
    #[arg(long, default_value = "example-client")]
    pub common_name: String,

    /// Number of requests to send. `1` performs a single `GetCertificate`
    /// call and prints the resulting certificate's fingerprint; more than
    /// `1` switches to benchmark mode, firing `count` requests bounded by
    /// `concurrency` in flight and reporting latency statistics.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,

    /// Number of requests to have in flight concurrently in benchmark
    /// mode.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,

    /// CSV file to write per-request latencies to in benchmark mode.
    #[arg(long)]
    pub output: Option<PathBuf>,
}
