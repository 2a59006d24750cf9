//! Adapter traits between the Coordinator and a BFT consensus engine.
//!
//! The engine depends on these three capabilities rather than on the
//! Coordinator directly, which is what breaks the cyclic reference a
//! concrete `Coordinator -> Engine -> Coordinator` wiring would otherwise
//! require: the engine only ever sees `dyn CommandSource`/`dyn
//! Acceptor`/`dyn Executor`, and the Coordinator is free to implement all
//! three without the engine crate depending on `hotcert-coordinator`.

use async_trait::async_trait;

/// Supplies commands to be proposed. Implemented by the gateway
/// replica's Coordinator; polled by the engine's leader role.
#[async_trait]
pub trait CommandSource: Send + Sync {
    /// Consume and return one pending command, or `None` if the source is
    /// empty or has been told to shut down. Never blocks.
    async fn get(&self) -> Option<Vec<u8>>;
}

/// Validates and tracks proposed commands. Implemented by every replica's
/// Coordinator; invoked by the engine during its replication phases.
#[async_trait]
pub trait Acceptor: Send + Sync {
    /// Decide whether `command` should be accepted into the engine's
    /// ordering. Called on every replica for every candidate command.
    async fn accept(&self, command: &[u8]) -> bool;

    /// Notify that `command` has been proposed by the leader and should be
    /// treated as no longer eligible for fresh acceptance (replay defense).
    async fn proposed(&self, command: &[u8]);
}

/// Applies committed commands. Implemented by every replica's
/// Coordinator; invoked by the engine once a command reaches a total
/// order all correct replicas agree on.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Apply `command`, now committed in the same order on every correct
    /// replica.
    async fn exec(&self, command: &[u8]);
}

/// The combination every replica's Coordinator implements and every
/// engine adapter depends on.
pub trait ReplicaHandle: CommandSource + Acceptor + Executor {}
impl<T: CommandSource + Acceptor + Executor> ReplicaHandle for T {}
