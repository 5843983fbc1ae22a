use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tiledump_db::ids::{Coords, TileRange, planetoid_root};

use crate::cli::Command;

/// Ids a command processes, or `None` when it looks documents up by path.
/// `Some` with an empty list means there is nothing to do and the store need
/// not be opened.
pub fn ids_for(command: &Command) -> Result<Option<Vec<String>>> {
    match command {
        Command::Fetch { ids, ids_file } => {
            collect_ids(ids.clone(), ids_file.as_deref()).map(Some)
        }
        Command::Tiles {
            planetoid,
            data_type,
            z,
            x,
            y,
        } => tile_ids(*planetoid, data_type, *z, x.clone(), y.clone()).map(Some),
        Command::Path { .. } => Ok(None),
    }
}

/// Non-empty, trimmed lines of an ids file.
pub fn read_ids_file(path: &Path) -> Result<Vec<String>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open ids file: {}", path.display()))?;

    BufReader::new(file)
        .lines()
        .map(|line| line.context("Failed to read line"))
        .filter_map(|line| match line {
            Ok(content) if !content.trim().is_empty() => Some(Ok(content.trim().to_string())),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect()
}

/// Ids given on the command line followed by the ones in `ids_file`.
pub fn collect_ids(mut ids: Vec<String>, ids_file: Option<&Path>) -> Result<Vec<String>> {
    if let Some(path) = ids_file {
        ids.extend(read_ids_file(path)?);
    }
    Ok(ids)
}

pub fn tile_ids(
    planetoid: i32,
    data_type: &str,
    z: u16,
    x: Coords,
    y: Coords,
) -> Result<Vec<String>> {
    let range = TileRange::new(planetoid_root(planetoid), data_type, z, x.0, y.0)
        .context("Invalid tile range")?;
    Ok(range.ids().collect())
}
