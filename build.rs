// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: configuration file
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("PATH")
        .default_value("/etc/productid/productid.toml")
        .global(true)
        .help("Path to the configuration file")
}

/// Common argument: debug logging
fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::SetTrue)
        .global(true)
        .help("Enable debug logging")
}

fn build_cli() -> Command {
    Command::new("productid")
        .version(env!("CARGO_PKG_VERSION"))
        .author("productid Contributors")
        .about("Keep product certificates in sync with the repositories installed packages came from")
        .subcommand_required(true)
        .arg(config_arg())
        .arg(verbose_arg())
        .subcommand(Command::new("active").about("Print repositories that installed packages came from"))
        .subcommand(
            Command::new("collect").about("Fetch product certificates from every enabled repository"),
        )
        .subcommand(
            Command::new("update")
                .about("Resolve active repositories and report the resulting certificate plan")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the plan as JSON"),
                ),
        )
        .subcommand(Command::new("repos").about("List enabled repositories"))
        .subcommand(
            Command::new("cache")
                .about("Package/repository cache")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the cached (name, arch, repository) records"))
                .subcommand(
                    Command::new("clear")
                        .about("Remove the cache file so the next run reloads repository metadata"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");

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

    let man_path = man_dir.join("productid.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
