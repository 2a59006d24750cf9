//! Wire transport for the three HotCertification endpoints, compiled
//! from `proto/hotcert.proto` with `tonic-build`.
//!
//! See `DESIGN.md` for the `tonic`/`prost` dependency's provenance.

pub mod proto {
    #![allow(clippy::all)]
    tonic::include_proto!("hotcert");
}

mod client;
mod convert;
mod error;
mod server;

pub use client::{CertificationClient, GrpcSigningBroadcaster};
pub use error::{Result, RpcError};
pub use server::{CertificationServer, ReplicationServer, SigningServer};
