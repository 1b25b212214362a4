use cfg_aliases::cfg_aliases;

#[allow(dead_code)]
#[path = "src/descriptor.rs"]
mod descriptor;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/descriptor.rs");

    // Setup cfg aliases
    cfg_aliases! {
        // Platforms
        windows_platform: { target_os = "windows" },
    }

    // The system libraries only exist when targeting Windows.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        for directive in descriptor::DESCRIPTOR.link_directives() {
            println!("{directive}");
        }
    }
}
