use crate::model::LoadedModel;
use std::fs;
use std::io;
use std::path::Path;

pub fn save_model(model: &LoadedModel, path: impl AsRef<Path>) -> io::Result<()> {
    let json = serde_json::to_string_pretty(model)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    fs::write(path, json)?;
    Ok(())
}

pub fn load_model(path: impl AsRef<Path>) -> io::Result<LoadedModel> {
    let json = fs::read_to_string(path)?;
    let model =
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    Ok(model)
}
