//! Generate UniFFI Kotlin bindings for Homify
//!
//! Run: cargo run --bin generate-bindings [-- --targets aarch64-linux-android,x86_64-linux-android]
//!
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ DEPENDENCY MAP - Output paths must match the Gradle module layout           │
//! │                                                                             │
//! │ Inputs:                                                                     │
//! │   target/release/libhomify.so            ← Host build used for bindgen      │
//! │                                                                             │
//! │ Outputs:                                                                    │
//! │   app/src/main/java/uniffi/homify/homify.kt   ← Kotlin bindings             │
//! │   app/src/main/jniLibs/<abi>/libhomify.so     ← One per Android target      │
//! └─────────────────────────────────────────────────────────────────────────────┘

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Android project root (contains `app/`)
    #[arg(long, default_value = "..")]
    android_root: PathBuf,

    /// Rust targets to cross-compile with cargo-ndk
    #[arg(long, value_delimiter = ',', default_value = "aarch64-linux-android,armv7-linux-androideabi,x86_64-linux-android")]
    targets: Vec<String>,

    /// Only regenerate the Kotlin file
    #[arg(long)]
    skip_native: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rust_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let workspace_root = rust_dir.parent().context("No parent directory")?;
    let android_root = rust_dir.join(&args.android_root);

    println!("Building Rust library...");
    run_cmd("cargo", &["build", "--release", "-p", "homify"], workspace_root)?;

    println!("Generating Kotlin bindings...");
    let library = workspace_root.join("target/release").join(host_library_name());
    let generated = rust_dir.join("generated");
    run_cmd(
        "cargo",
        &[
            "run",
            "--bin",
            "uniffi-bindgen",
            "generate",
            "--library",
            &library.to_string_lossy(),
            "--language",
            "kotlin",
            "--out-dir",
            &generated.to_string_lossy(),
        ],
        &rust_dir,
    )?;

    let kotlin_src = generated.join("uniffi/homify/homify.kt");
    let kotlin_dest = android_root.join("app/src/main/java/uniffi/homify");
    fs::create_dir_all(&kotlin_dest)
        .with_context(|| format!("Create {}", kotlin_dest.display()))?;
    fs::copy(&kotlin_src, kotlin_dest.join("homify.kt"))
        .with_context(|| format!("Copy {}", kotlin_src.display()))?;

    if !args.skip_native {
        println!("Building Android libraries...");
        let jni_libs = android_root.join("app/src/main/jniLibs");
        let mut ndk_args = vec!["ndk".to_string()];
        for target in &args.targets {
            ndk_args.push("-t".to_string());
            ndk_args.push(target.clone());
        }
        ndk_args.extend([
            "-o".to_string(),
            jni_libs.to_string_lossy().to_string(),
            "build".to_string(),
            "--release".to_string(),
            "-p".to_string(),
            "homify".to_string(),
        ]);
        let ndk_args: Vec<&str> = ndk_args.iter().map(String::as_str).collect();
        run_cmd("cargo", &ndk_args, workspace_root)?;
    }

    println!("Done! Bindings regenerated successfully.");
    println!("Generated files:");
    println!("  - {}/homify.kt (UniFFI generated)", kotlin_dest.display());
    if !args.skip_native {
        println!("  - {}/<abi>/libhomify.so", android_root.join("app/src/main/jniLibs").display());
    }
    Ok(())
}

fn host_library_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "libhomify.dylib"
    } else if cfg!(target_os = "windows") {
        "homify.dll"
    } else {
        "libhomify.so"
    }
}

fn run_cmd(program: &str, args: &[&str], dir: &Path) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .with_context(|| format!("Failed to run {}", program))?;
    if !status.success() {
        bail!("{} {} failed with {}", program, args.join(" "), status);
    }
    Ok(())
}
