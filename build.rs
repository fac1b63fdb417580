// Expose the compile-time target triple so the pipeline can default to it
// when no target is configured and can tell whether a rustup target must be
// installed.

fn main() {
    let target = std::env::var("TARGET")
        .expect("TARGET env var not set by Cargo. This should never happen in a normal build.");

    println!("cargo:rustc-env=RELPACK_HOST_TARGET={target}");
}
