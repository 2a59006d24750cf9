//! Adapter traits between the Coordinator and a BFT consensus engine,
//! plus an in-process test double that implements the ordering contract
//! those traits describe without any real networking or fault tolerance.

mod local_orderer;
mod traits;

pub use local_orderer::LocalOrderer;
pub use traits::{Acceptor, CommandSource, Executor, ReplicaHandle};
