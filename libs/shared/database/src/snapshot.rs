use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use tracing::debug;

use shared_models::clinical::ClinicalId;

use crate::store::ClinicalData;

/// Read a snapshot. A missing file is not an error.
pub fn load_snapshot(path: &Path) -> Result<Option<ClinicalData>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading snapshot {}", path.display())),
    };

    let mut data: ClinicalData = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    data.reconcile_counter();
    ensure!(
        data.highest_id() < ClinicalId::MAX,
        "snapshot {} has no ids left to assign",
        path.display()
    );

    debug!("Loaded snapshot with {} appointments", data.appointments.len());
    Ok(Some(data))
}

/// Write through a sibling temp file so readers never see a half-written snapshot.
pub fn write_snapshot(path: &Path, data: &ClinicalData) -> Result<()> {
    let body = serde_json::to_vec_pretty(data).context("serializing snapshot")?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
