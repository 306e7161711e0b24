//! Build script for unarya-core.
//!
//! This script compiles the protobuf definitions into Rust code.
//!
//! Note: Build scripts require `println!` for cargo integration, so we allow
//! this disallowed item here.
#![allow(clippy::disallowed_macros)]

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        .build_server(true)
        // Client is used by the CLI and the integration tests
        .build_client(true)
        .compile_protos(&["proto/unarya.proto"], &["proto/"])?;

    println!("cargo:rerun-if-changed=proto/");

    Ok(())
}
