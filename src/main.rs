use std::fs::File;
use std::path::Path;
use std::process;

use clap::{crate_authors, crate_description, crate_version, Arg, Command};
use failure::Error;
use log::{error, info};
use simplelog::{ColorChoice, CombinedLogger, SharedLogger, TermLogger, TerminalMode, WriteLogger};

use crate::descriptors::Descriptors;
use crate::pipeline::{generate_mmd, MmdRequest};
use crate::settings::Settings;

mod catalog;
mod descriptors;
mod extract;
mod geometry;
mod metadata;
mod mission;
mod mmd;
mod pipeline;
mod reconcile;
mod settings;
#[cfg(test)]
mod test_utils;
mod xml_query;

fn main() {
    let matches = Command::new("Sentinel MMD")
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg(
            Arg::new("product")
                .short('p')
                .long("product")
                .value_name("FILENAME")
                .help("The product filename to generate an MMD document for")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("global_attributes")
                .short('g')
                .long("global-attributes")
                .value_name("YAML")
                .help("The global attributes configuration")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("platform_metadata")
                .short('l')
                .long("platform-metadata")
                .value_name("YAML")
                .help("The platform metadata configuration")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("product_metadata")
                .short('r')
                .long("product-metadata")
                .value_name("CSV")
                .help("The metadata table of all product types")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("parent_ids")
                .short('i')
                .long("parent-ids")
                .value_name("YAML")
                .help("The parent dataset ids by platform and product type")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("mmd_path")
                .short('m')
                .long("mmd-path")
                .value_name("FILE")
                .help("Where to write the MMD document")
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("overwrite")
                .short('o')
                .long("overwrite")
                .help("Overwrite an existing document"),
        )
        .arg(
            Arg::new("filepath")
                .short('f')
                .long("filepath")
                .value_name("FILE")
                .help("The local data file (.zip or .nc) to extract metadata from")
                .takes_value(true),
        )
        .arg(
            Arg::new("json_metadata")
                .short('j')
                .long("json-metadata")
                .value_name("JSON")
                .help("Metadata of an earlier catalogue query")
                .takes_value(true),
        )
        .arg(
            Arg::new("settings")
                .short('s')
                .long("settings")
                .value_name("SETTINGS")
                .help("Specify an additional settings file")
                .takes_value(true),
        )
        .get_matches();

    let settings =
        Settings::new(matches.value_of("settings").map(Path::new)).expect("Unable to use config file.");

    initialize_logger(Path::new(&settings.general.log_file), &settings)
        .expect("Unable to initialize logger.");

    let required = |name: &str| {
        Path::new(
            matches
                .value_of(name)
                .expect("Required arguments are checked by clap."),
        )
    };

    let output = required("mmd_path");
    if output.is_dir() {
        error!("Output path is a directory, not a file: {}", output.display());
        process::exit(1);
    }

    let descriptors = match Descriptors::load(
        required("global_attributes"),
        required("platform_metadata"),
        required("product_metadata"),
        required("parent_ids"),
    ) {
        Ok(descriptors) => descriptors,
        Err(e) => {
            error!("Unable to load configuration: {}", e);
            process::exit(1);
        }
    };

    let request = MmdRequest {
        product: matches
            .value_of("product")
            .expect("Required arguments are checked by clap."),
        output,
        overwrite: matches.is_present("overwrite"),
        filepath: matches.value_of("filepath").map(Path::new),
        snapshot: matches.value_of("json_metadata").map(Path::new),
    };

    match generate_mmd(&request, &descriptors, &settings) {
        Ok(true) => info!("Finished {}", request.product),
        Ok(false) => info!("Kept existing document {}", output.display()),
        Err(e) => {
            error!("Unable to generate MMD document for {}: {}", request.product, e);
            process::exit(1);
        }
    }
}

/// Initialize the logger.
fn initialize_logger(file_path: &Path, settings: &Settings) -> Result<(), Error> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    let log_level = if settings.general.debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    loggers.push(TermLogger::new(
        log_level,
        simplelog::Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ));

    if let Ok(file) = File::create(file_path) {
        loggers.push(WriteLogger::new(
            log_level,
            simplelog::Config::default(),
            file,
        ));
    }

    CombinedLogger::init(loggers)?;

    Ok(())
}
