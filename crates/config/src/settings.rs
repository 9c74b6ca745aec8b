// Directory layout settings
// Loaded from ~/.config/polrecon/settings.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Folders the source exports are dropped into. Relative paths resolve
/// against `data_dir`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDirs {
    pub sics: PathBuf,
    pub sharepoint: PathBuf,
    pub rimac: PathBuf,
    /// Every workbook here is a Pacífico ledger sheet (vigente / no vigente)
    pub pacifico: PathBuf,
    /// A single file, not a folder
    pub cancellations: PathBuf,
}

impl Default for InputDirs {
    fn default() -> Self {
        Self {
            sics: PathBuf::from("input/PreparaciónSics"),
            sharepoint: PathBuf::from("input/PreparaciónSharepoint"),
            rimac: PathBuf::from("input/PreparaciónRimac"),
            pacifico: PathBuf::from("input/PreparaciónPacífico"),
            cancellations: PathBuf::from("input/PreparaciónPacífico/Anulados/Anulados.xlsx"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputDirs {
    /// Reconciliation reports
    pub rimac: PathBuf,
    pub pacifico: PathBuf,
    // Prepared sources
    pub prepared: PathBuf,
    pub pacifico_prepared: PathBuf,
    pub cancellations_prepared: PathBuf,
}

impl Default for OutputDirs {
    fn default() -> Self {
        Self {
            rimac: PathBuf::from("output/Rimac"),
            pacifico: PathBuf::from("output/PacíficoIntegrado"),
            prepared: PathBuf::from("output"),
            pacifico_prepared: PathBuf::from("output/Pacífico"),
            cancellations_prepared: PathBuf::from("output/Pacífico/PacificoAnulado"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub input: InputDirs,
    pub output: OutputDirs,
    /// Lookup tables file; the built-in tables are used when unset
    pub lookups: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            input: InputDirs::default(),
            output: OutputDirs::default(),
            lookups: None,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("polrecon");
        config_dir.join("settings.toml")
    }

    /// Load from an explicit file (which must exist), else from the
    /// per-user file when present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse a settings file. A relative `data_dir` (or `lookups`) is taken
    /// relative to the file's own folder.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {}", path.display(), e))?;
        let mut settings: Settings = toml::from_str(&contents)
            .map_err(|e| format!("Error parsing {}: {}", path.display(), e))?;

        if let Some(base) = path.parent() {
            if settings.data_dir.is_relative() {
                settings.data_dir = base.join(&settings.data_dir);
            }
            if let Some(lookups) = settings.lookups.as_mut() {
                if lookups.is_relative() {
                    *lookups = base.join(&*lookups);
                }
            }
        }
        Ok(settings)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn sics_input(&self) -> PathBuf {
        self.resolve(&self.input.sics)
    }

    pub fn sharepoint_input(&self) -> PathBuf {
        self.resolve(&self.input.sharepoint)
    }

    pub fn rimac_input(&self) -> PathBuf {
        self.resolve(&self.input.rimac)
    }

    pub fn pacifico_input(&self) -> PathBuf {
        self.resolve(&self.input.pacifico)
    }

    pub fn cancellations_file(&self) -> PathBuf {
        self.resolve(&self.input.cancellations)
    }

    pub fn rimac_output(&self) -> PathBuf {
        self.resolve(&self.output.rimac)
    }

    pub fn pacifico_output(&self) -> PathBuf {
        self.resolve(&self.output.pacifico)
    }

    pub fn prepared_output(&self) -> PathBuf {
        self.resolve(&self.output.prepared)
    }

    pub fn pacifico_prepared_output(&self) -> PathBuf {
        self.resolve(&self.output.pacifico_prepared)
    }

    pub fn cancellations_prepared_output(&self) -> PathBuf {
        self.resolve(&self.output.cancellations_prepared)
    }

    /// Get the config file path for display
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}
