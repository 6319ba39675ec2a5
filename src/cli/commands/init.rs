use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILENAME, Config};

pub fn cmd_init(path: Option<&Path>) -> anyhow::Result<()> {
    let path = path.map_or_else(|| PathBuf::from(CONFIG_FILENAME), Path::to_path_buf);

    if Config::create_default_if_missing(&path)? {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists, left unchanged", path.display());
    }

    Ok(())
}
