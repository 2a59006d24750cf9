//! Threshold RSA signing (Shoup's scheme) and X.509 certificate
//! construction for HotCertification replicas.
//!
//! No corpus repository implements RSA threshold signatures; the partial
//! signing, share verification, and Lagrange combination here follow the
//! scheme's own mathematics directly rather than any example's code.

mod cert;
mod combine;
mod error;
mod key;
mod keygen;
mod pem;
mod root_cert;
mod shares;
mod sign;

pub use cert::{build_tbs, pkcs1v15_pad_digest, splice_signature, ISSUER_NAME};
pub use combine::combine;
pub use error::{CryptoError, Result};
pub use key::{KeyMeta, KeyShare, ThresholdKey, VerificationKey};
pub use keygen::generate_threshold_keys;
pub use pem::{
    read_cert_file, read_threshold_key_file, write_cert_file, write_threshold_key_file,
    CERTIFICATE_LABEL, THRESHOLD_KEY_LABEL,
};
pub use root_cert::generate_root_cert;
pub use shares::{SealedSigShareSet, SigShareSet};
pub use sign::{partial_sign, verify_share};
