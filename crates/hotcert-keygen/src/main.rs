//! Trusted-dealer key generation: generates the threshold RSA key,
//! self-signs the root CA certificate by running the real signing
//! protocol over it, and generates one replication-transport keypair per
//! replica.
//!
//! Everything this binary produces is written to disk and then forgotten;
//! there is no long-running state.

use std::fs;
use std::path::Path;

use clap::Parser;
use ed25519_dalek::SigningKey;
use rand_core::OsRng;
use tracing::info;

use hotcert_config::KeygenArgs;
use hotcert_crypto::{generate_root_cert, generate_threshold_keys, write_cert_file, write_threshold_key_file};

const REPLICATION_PRIVATE_LABEL: &str = "HOTCERTIFICATION REPLICATION PRIVATE KEY";
const REPLICATION_PUBLIC_LABEL: &str = "HOTCERTIFICATION REPLICATION PUBLIC KEY";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = KeygenArgs::parse();

    if ![512, 1024, 2048, 4096].contains(&args.key_size) {
        anyhow::bail!("key-size must be one of 512/1024/2048/4096, got {}", args.key_size);
    }
    if args.threshold == 0 || args.threshold > args.num {
        anyhow::bail!("threshold must be in 1..={}, got {}", args.num, args.threshold);
    }

    fs::create_dir_all(&args.destination)?;

    info!(num = args.num, threshold = args.threshold, key_size = args.key_size, "generating threshold keys");
    let (keys, meta) = generate_threshold_keys(args.threshold as usize, args.num as usize, args.key_size)?;

    info!("self-signing root certificate");
    let root_cert = generate_root_cert(&keys, &meta)?;
    write_cert_file(args.destination.join("root.crt"), &root_cert)?;

    for (idx, key) in keys.iter().enumerate() {
        let path = args.destination.join(format!("p{}.thresholdkey", idx + 1));
        write_threshold_key_file(&path, key)?;
    }

    info!("generating replication transport keypairs");
    for i in 1..=args.num {
        let signing_key = SigningKey::generate(&mut OsRng);
        write_replication_private_key(args.destination.join(format!("p{i}.key")), &signing_key)?;
        write_replication_public_key(
            args.destination.join(format!("p{i}.pub")),
            &signing_key.verifying_key(),
        )?;
    }

    println!(
        "Generated threshold keys, root certificate, and replication keypairs for {} replicas in {}",
        args.num,
        args.destination.display()
    );
    Ok(())
}

fn write_replication_private_key(path: impl AsRef<Path>, key: &SigningKey) -> anyhow::Result<()> {
    let encoded = pem::encode(&pem::Pem::new(REPLICATION_PRIVATE_LABEL, key.to_bytes().to_vec()));
    fs::write(&path, encoded)?;
    set_private_mode(path.as_ref())?;
    Ok(())
}

fn write_replication_public_key(
    path: impl AsRef<Path>,
    key: &ed25519_dalek::VerifyingKey,
) -> anyhow::Result<()> {
    let encoded = pem::encode(&pem::Pem::new(REPLICATION_PUBLIC_LABEL, key.to_bytes().to_vec()));
    fs::write(path, encoded)?;
    Ok(())
}

#[cfg(unix)]
fn set_private_mode(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_private_mode(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
