use std::io;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build");
    println!("cargo:rustc-check-cfg=cfg(allocator_api, values(\"1.50\", \"unstable\"))");

    if feature_test("allocator_api_1_50_stable") {
        println!("cargo:rustc-cfg=allocator_api=\"1.50\"");
    } else if feature_test("allocator_api_1_50_unstable") {
        println!("cargo:rustc-cfg=allocator_api=\"1.50\"");
        println!("cargo:rustc-cfg=allocator_api=\"unstable\"");
    }
}

fn feature_test(feature: &str) -> bool {
    feature_test_impl(feature).unwrap_or_else(|err| panic!("error testing feature {feature:?}: {err:?}"))
}

fn feature_test_impl(feature: &str) -> Result<bool, io::Error> {
    let out_dir = std::env::var_os("OUT_DIR").ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR not set"))?;
    let target  = std::env::var_os("TARGET" ).ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "TARGET not set"))?;
    let rustc   = std::env::var_os("RUSTC"  ).unwrap_or_else(|| "rustc".into());

    let mut rustc = Command::new(rustc);
    rustc
        .arg("--crate-name").arg(format!("feature_test_{feature}"))
        .arg("--crate-type=lib")
        .arg("--edition=2021")
        .arg("--out-dir").arg(out_dir)
        .arg("--target").arg(target)
        .arg("--emit=metadata")
        .arg(format!("build/feature/test/{feature}.rs"))
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        ;
    Ok(rustc.status()?.success())
}
