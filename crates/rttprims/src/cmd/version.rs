use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("rttprims {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: rttprims");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("build_target: {}", env!("RTTPRIMS_BUILD_TARGET"));
    println!("build_profile: {}", env!("RTTPRIMS_BUILD_PROFILE"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("pointer_width: {}", usize::BITS);
    println!(
        "features: acquire-release={}, cli=true",
        cfg!(feature = "acquire-release")
    );

    Ok(SUCCESS)
}
