#[macro_use]
extern crate clap;
extern crate failure;
extern crate env_logger;
extern crate log;
extern crate serde_json;

use std::path::PathBuf;
use std::io::BufWriter;
use std::fs::{self, File};

use failure::Error;
use log::info;

use mappings::{MinecraftVersion, DirectoryLoader, OfficialMappingsCache};

fn app() -> clap::App<'static, 'static> {
    clap_app!(official_mappings =>
        (version: crate_version!())
        (author: crate_authors!())
        (about: crate_description!())
        (@arg output_dir: --out +takes_value "The output directory to place the parsed mappings")
        (@arg mappings_dir: --mappings +takes_value default_value[mappings] "The directory containing {version}/client.txt and {version}/server.txt")
        (@arg minecraft_versions: +required +multiple "The minecraft versions to parse the mappings for")
    )
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let matches = app().get_matches();
    let versions: Vec<MinecraftVersion> = values_t!(matches, "minecraft_versions", MinecraftVersion)
        .unwrap_or_else(|e| e.exit());
    let mappings_location = PathBuf::from(matches.value_of("mappings_dir").unwrap_or("mappings"));
    let out = PathBuf::from(matches.value_of("output_dir").unwrap_or("."));
    fs::create_dir_all(&out)?;
    let cache = OfficialMappingsCache::new(DirectoryLoader::new(mappings_location));
    for &version in &versions {
        let mappings = cache.load_mappings(version)?;
        let out_location = out.join(format!("{}.json", version));
        let writer = BufWriter::new(File::create(&out_location)?);
        serde_json::to_writer_pretty(writer, &*mappings)?;
        info!("Wrote {} mappings to {}", mappings.len(), out_location.display());
    }
    Ok(())
}
