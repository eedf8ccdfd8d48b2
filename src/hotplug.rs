use std::fmt;
use std::path::PathBuf;

/// Échec d'une demande de mise en ligne / hors ligne
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotplugError {
    /// Le CPU est déjà en ligne (course bénigne avec l'état plateforme)
    AlreadyOnline,
    /// Le CPU est déjà hors ligne (course bénigne avec l'état plateforme)
    AlreadyOffline,
    /// La plateforme a refusé la demande
    Refused,
    /// La plateforme protège ce CPU (le CPU de boot ne se débranche pas)
    LastCpuProtected,
}

impl fmt::Display for HotplugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HotplugError::AlreadyOnline => write!(f, "cpu déjà en ligne"),
            HotplugError::AlreadyOffline => write!(f, "cpu déjà hors ligne"),
            HotplugError::Refused => write!(f, "demande refusée par la plateforme"),
            HotplugError::LastCpuProtected => write!(f, "cpu protégé par la plateforme"),
        }
    }
}

/// Contrôleur de cycle de vie des CPUs
pub trait CpuHotplug {
    /// État courant côté plateforme, utilisé pour amorcer le registre
    fn is_online(&self, cpu: usize) -> bool;

    fn activate(&mut self, cpu: usize) -> Result<(), HotplugError>;

    fn deactivate(&mut self, cpu: usize) -> Result<(), HotplugError>;
}

/// Contrôleur écrivant dans les fichiers `cpuN/online` de sysfs
pub struct SysfsHotplug {
    root: PathBuf,
}

impl SysfsHotplug {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn online_path(&self, cpu: usize) -> PathBuf {
        self.root.join(format!("cpu{cpu}")).join("online")
    }

    fn read_online(&self, cpu: usize) -> Option<bool> {
        let content = std::fs::read_to_string(self.online_path(cpu)).ok()?;
        Some(content.trim() == "1")
    }
}

impl CpuHotplug for SysfsHotplug {
    fn is_online(&self, cpu: usize) -> bool {
        // cpu0 n'expose pas de fichier online : toujours en ligne
        self.read_online(cpu).unwrap_or(cpu == 0)
    }

    fn activate(&mut self, cpu: usize) -> Result<(), HotplugError> {
        match self.read_online(cpu) {
            Some(true) => Err(HotplugError::AlreadyOnline),
            Some(false) => std::fs::write(self.online_path(cpu), "1\n")
                .map_err(|_| HotplugError::Refused),
            None => Err(HotplugError::Refused),
        }
    }

    fn deactivate(&mut self, cpu: usize) -> Result<(), HotplugError> {
        if cpu == 0 {
            return Err(HotplugError::LastCpuProtected);
        }
        match self.read_online(cpu) {
            Some(false) => Err(HotplugError::AlreadyOffline),
            Some(true) => std::fs::write(self.online_path(cpu), "0\n")
                .map_err(|_| HotplugError::Refused),
            None => Err(HotplugError::Refused),
        }
    }
}
