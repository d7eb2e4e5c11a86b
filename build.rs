// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn flag(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(long).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("peerup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Update npm dependencies to the newest versions that satisfy each other's peer dependencies")
        .arg(flag("debug", "debug", "Verbose output (debug logging)").short('v'))
        .arg(flag(
            "dry_run",
            "dry-run",
            "Show the updates without writing package.json or installing",
        ))
        .arg(flag(
            "set_caret",
            "set-caret",
            "Write updated versions with a caret prefix (^1.2.3)",
        ))
        .arg(flag(
            "set_tilde",
            "set-tilde",
            "Write updated versions with a tilde prefix (~1.2.3); wins over --set-caret",
        ))
        .arg(flag(
            "no_install",
            "no-install",
            "Do not run npm install after writing package.json",
        ))
        .arg(
            Arg::new("project")
                .short('p')
                .long("project")
                .value_name("DIR")
                .default_value(".")
                .help("Project directory containing package.json and node_modules"),
        )
        .arg(
            Arg::new("manifest")
                .short('m')
                .long("manifest")
                .value_name("PATH")
                .help("Manifest to update (default: <project>/package.json)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Config file (default: <project>/peerup.toml if present)"),
        )
        .arg(
            Arg::new("npm")
                .long("npm")
                .value_name("PATH")
                .help("npm executable to run"),
        )
        .arg(flag("quiet", "quiet", "Hide the progress bar").short('q'))
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("peerup.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
