use std::{fs, path::Path};

use actuator_shared::CurveSet;
use log::info;

use crate::error::{io_error, Error};

pub fn load(path: &Path) -> Result<CurveSet, Error> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    let curves = serde_json::from_str(&text)?;
    info!("Loaded curves from {}", path.display());
    Ok(curves)
}

pub fn save(path: &Path, curves: &CurveSet) -> Result<(), Error> {
    let text = serde_json::to_string_pretty(curves)?;
    fs::write(path, text).map_err(io_error(path))?;
    info!("Saved curves to {}", path.display());
    Ok(())
}
