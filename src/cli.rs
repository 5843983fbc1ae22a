use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tiledump_db::ids::Coords;
use tiledump_db::{MissPolicy, StoreConfig};

/// Dump FileContent documents from the document store to local files
#[derive(Parser, Debug)]
#[command(name = "tiledump", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Directory every document is written under
    #[arg(long, env = "DEBUG_ROOT", default_value = "debug")]
    pub debug_root: PathBuf,

    /// What to do when an id has no record: skip or fail
    #[arg(long, env = "ON_MISSING", default_value_t = MissPolicy::Skip)]
    pub on_missing: MissPolicy,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct StoreArgs {
    #[arg(long, env = "MONGO_URL", default_value = tiledump_db::DEFAULT_MONGO_URL)]
    pub mongo_url: String,

    #[arg(long, env = "MONGO_DATABASE", default_value = tiledump_db::DEFAULT_DATABASE)]
    pub database: String,

    #[arg(long, env = "MONGO_COLLECTION", default_value = tiledump_db::DEFAULT_COLLECTION)]
    pub collection: String,

    /// GridFS bucket holding payloads too large for a single document
    #[arg(long, env = "MONGO_BUCKET", default_value = tiledump_db::DEFAULT_BUCKET)]
    pub bucket: String,
}

impl StoreArgs {
    pub fn config(&self) -> StoreConfig {
        StoreConfig {
            url: self.mongo_url.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
            bucket: self.bucket.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch documents by id
    Fetch {
        /// Document ids, processed in order
        ids: Vec<String>,

        /// File with one id per line; read after the ids given as arguments
        #[arg(long, value_name = "FILE")]
        ids_file: Option<PathBuf>,
    },

    /// Fetch a grid of tiles for one planetoid, data type and level of detail
    Tiles {
        #[arg(long)]
        planetoid: i32,

        /// e.g. com.PlanetoidGen.Procedural.HeightMapGrayscaleEncoded
        #[arg(long)]
        data_type: String,

        #[arg(long)]
        z: u16,

        /// X coordinates: "0", "0..2", "0..=1" or "0,3"
        #[arg(long, allow_hyphen_values = true)]
        x: Coords,

        /// Y coordinates, same syntax as --x
        #[arg(long, allow_hyphen_values = true)]
        y: Coords,
    },

    /// Fetch a single document by its local path and file name
    Path {
        #[arg(long)]
        local_path: String,

        #[arg(long)]
        file_name: String,
    },
}
