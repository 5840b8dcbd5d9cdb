//! Optional PIF boot image loading.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::{
    engine::{Engine, EngineError},
    host::SystemType,
    overlay::CoreSettings,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PifOutcome {
    Loaded { path: PathBuf, len: usize },
    Skipped(PifSkip),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PifSkip {
    Recompiler,
    Disabled,
    UnknownSystem,
    NotConfigured(SystemType),
    NotAFile(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PifError {
    #[error("failed to read PIF image {path}: {message}")]
    Read { path: PathBuf, message: String },
    #[error("engine rejected PIF image: {0}")]
    Rejected(#[from] EngineError),
}

/// Hands the configured boot image for `system` to the engine.
///
/// Only interpreter modes boot through the PIF; everything short of an I/O or
/// engine failure is a skip.
pub fn load_boot_image(
    engine: &dyn Engine,
    settings: &CoreSettings,
    system: Option<SystemType>,
) -> Result<PifOutcome, PifError> {
    if !settings.cpu_emulator.is_interpreter() {
        return Ok(PifOutcome::Skipped(PifSkip::Recompiler));
    }
    if !settings.pif.use_pif {
        return Ok(PifOutcome::Skipped(PifSkip::Disabled));
    }
    let Some(system) = system else {
        return Ok(PifOutcome::Skipped(PifSkip::UnknownSystem));
    };

    let configured = match system {
        SystemType::Ntsc => settings.pif.ntsc_image.as_ref(),
        SystemType::Pal => settings.pif.pal_image.as_ref(),
    };
    let Some(path) = configured.filter(|path| !path.as_os_str().is_empty()) else {
        return Ok(PifOutcome::Skipped(PifSkip::NotConfigured(system)));
    };
    if !path.is_file() {
        debug!(path = %path.display(), "PIF image is not a regular file");
        return Ok(PifOutcome::Skipped(PifSkip::NotAFile(path.clone())));
    }

    let image = std::fs::read(path).map_err(|err| PifError::Read {
        path: path.clone(),
        message: err.to_string(),
    })?;
    engine.open_pif(&image)?;
    info!(path = %path.display(), %system, len = image.len(), "PIF boot image loaded");
    Ok(PifOutcome::Loaded {
        path: path.clone(),
        len: image.len(),
    })
}
