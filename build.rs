// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: feed file for offline runs
fn feed_file_arg() -> Arg {
    Arg::new("feed_file")
        .long("feed-file")
        .value_name("PATH")
        .help("Read the feed from a file instead of the server")
}

fn flag(name: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(long).action(ArgAction::SetTrue).help(help)
}

fn build_cli() -> Command {
    Command::new("aamporter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Mirror Adobe AAM updates and import them into Munki")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .default_value("aamporter.toml")
                .help("Path to the configuration file (TOML or plist)"),
        )
        .arg(flag("verbose", "verbose", "Show debug output").short('v'))
        .arg(flag("quiet", "quiet", "Only show warnings and errors").short('q'))
        .subcommand(
            Command::new("mirror")
                .about("Download current updates for every configured product")
                .arg(flag("munkiimport", "munkiimport", "Import downloaded updates with munkiimport").short('m'))
                .arg(flag("include_revoked", "include-revoked", "Also process versions that are revoked or superseded").short('r'))
                .arg(flag("force_import", "force-import", "Run munkiimport even when an identical item is already in the repo").short('f'))
                .arg(flag("include_all_licensing", "include-all-licensing", "Keep updates that are restricted by licensing type"))
                .arg(flag("dry_run", "dry-run", "Resolve updates and fetch details, but download nothing"))
                .arg(feed_file_arg())
                .arg(flag("no_progress", "no-progress", "Disable download progress bars")),
        )
        .subcommand(
            Command::new("feed")
                .about("Show how the feed resolves for configured channels")
                .arg(Arg::new("channel").long("channel").help("Only show this channel"))
                .arg(feed_file_arg())
                .arg(flag("all", "all", "List every version, not only the resolved latest").short('a')),
        )
        .subcommand(
            Command::new("import-ccp")
                .about("Import Creative Cloud Packager builds with munkiimport")
                .arg(Arg::new("dir").required(true).help("Directory containing one folder per CCP package")),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell to generate completions for"),
                ),
        )
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

    let man_path = man_dir.join("aamporter.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
