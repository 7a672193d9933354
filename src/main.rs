use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use log::{error, info};
use scorm_pack::config::load_request;
use scorm_pack::{ErrorKind, PackageError, PackageRequest, Packager, VERSION_TABLE};

fn main() -> Result<()> {
    colog::init();
    let args = std::env::args().collect::<Vec<String>>();
    let argc = args.len();

    for arg in &args {
        match arg.as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--version" | "-v" => {
                println!("{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            _ => {} // Positional argument or a command flag
        }
    }

    if argc < 2 {
        error!("Not enough arguments!");
        print_help();
        exit(exitcode::USAGE);
    }

    match args[1].as_str() {
        "build" => {
            if argc < 3 {
                error!("Not enough arguments!");
                exit(exitcode::USAGE);
            }
            let mut request = match load_request(&PathBuf::from(&args[2])) {
                Ok(x) => x,
                Err(e) => {
                    error!("{}", e);
                    exit(exitcode::CONFIG);
                }
            };
            let definitions = apply_flags(&mut request, &args[3..]);

            let mut packager = Packager::new().with_progress(true);
            if let Some(root) = definitions {
                packager = packager.with_definitions_root(root);
            }
            // The packager has already logged the failure.
            if let Err(e) = packager.build_with_callback(&request, |msg| info!("{}", msg)) {
                exit(exit_code(&e));
            }
        }
        "versions" => {
            for (spelling, selection) in VERSION_TABLE {
                println!("{:<18} {}", spelling, selection.dialect.schema_version());
            }
        }
        cmd => {
            error!("Unknown command {}!", cmd);
            print_help();
            exit(exitcode::USAGE);
        }
    }

    Ok(())
}

/// Applies `build` flags to `request`, returning a definitions root override.
fn apply_flags(request: &mut PackageRequest, flags: &[String]) -> Option<PathBuf> {
    let mut definitions = None;
    let mut i = 0;
    while i < flags.len() {
        match flags[i].as_str() {
            "--zip" => request.package.zip = Some(true),
            "--append-time" => request.package.append_time_to_output = Some(true),
            "--output" | "--definitions" => {
                let value = match flags.get(i + 1) {
                    Some(x) => PathBuf::from(x),
                    None => {
                        error!("{} needs a directory argument!", flags[i]);
                        exit(exitcode::USAGE);
                    }
                };
                if flags[i] == "--output" {
                    request.package.output_folder = Some(value);
                } else {
                    definitions = Some(value);
                }
                i += 1;
            }
            flag => {
                error!("Unknown flag {}!", flag);
                exit(exitcode::USAGE);
            }
        }
        i += 1;
    }
    definitions
}

fn exit_code(e: &PackageError) -> i32 {
    match e.kind() {
        ErrorKind::UnsupportedVersion => exitcode::DATAERR,
        ErrorKind::InvalidConfig => exitcode::CONFIG,
        ErrorKind::Io => exitcode::IOERR,
        ErrorKind::DefinitionFileMissing => exitcode::SOFTWARE,
    }
}

fn print_help() {
    println!(
        "Usage: scorm-pack command [additional arguments]

Packages a directory of course content as a SCORM 1.2 / 2004 package.

Commands:
    build <request.ron>    Writes the manifest, metadata and schema files into the
                           request's source directory
        --zip                  Also zip the package
        --append-time          Add a timestamp to the zip file name
        --output <dir>         Folder for the zip file
        --definitions <dir>    Folder holding the bundled schema files
    versions               Lists the accepted SCORM version spellings"
    );
}
