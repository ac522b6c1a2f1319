// Build metadata for `rttprims version --extended`.
fn main() {
    for (var, exported) in [
        ("TARGET", "RTTPRIMS_BUILD_TARGET"),
        ("PROFILE", "RTTPRIMS_BUILD_PROFILE"),
    ] {
        let value = std::env::var(var).unwrap_or_else(|_| "unknown".to_owned());
        println!("cargo:rustc-env={exported}={value}");
        println!("cargo:rerun-if-env-changed={var}");
    }
}
