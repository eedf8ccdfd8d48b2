use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::governor::GovernorState;

/// Instantané de diagnostic du gouverneur
///
/// Exposé en lecture seule pour les observateurs externes ; personne
/// d'autre que le thread d'évaluation ne modifie l'état lui-même.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct GovernorStatus {
    pub active: bool,
    pub cycles: u64,
    pub online: Vec<usize>,
    pub idle_streaks: Vec<u32>,
}

impl GovernorStatus {
    pub fn snapshot(state: &GovernorState, active: bool) -> Self {
        Self {
            active,
            cycles: state.cycles,
            online: state
                .slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.active)
                .map(|(cpu, _)| cpu)
                .collect(),
            idle_streaks: state.slots.iter().map(|s| s.idle_streak).collect(),
        }
    }
}

/// Écrit l'instantané de manière atomique via un fichier temporaire
pub fn write(path: &Path, state: &GovernorState, active: bool) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Erreur création répertoire: {}", e))?;
    }

    let snapshot = GovernorStatus::snapshot(state, active);
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| format!("Erreur sérialisation: {}", e))?;

    let temp_path = path.with_extension("tmp");
    let mut file =
        File::create(&temp_path).map_err(|e| format!("Erreur création fichier temporaire: {}", e))?;
    file.write_all(json.as_bytes())
        .map_err(|e| format!("Erreur écriture: {}", e))?;
    file.flush().map_err(|e| format!("Erreur flush: {}", e))?;

    // Renommer atomiquement
    fs::rename(&temp_path, path).map_err(|e| format!("Erreur rename: {}", e))?;

    Ok(())
}
