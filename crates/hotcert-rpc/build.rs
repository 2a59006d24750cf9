fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = prost_build::Config::new();
    config.bytes(["."]);

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_with_config(config, &["proto/hotcert.proto"], &["proto"])?;

    println!("cargo:rerun-if-changed=proto/hotcert.proto");
    Ok(())
}
