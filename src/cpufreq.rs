use std::fmt;
use std::path::PathBuf;

/// Instantané de la politique de fréquence d'un CPU (valeurs en kHz)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuPolicy {
    pub cur: u32,
    pub min: u32,
    pub max: u32,
}

impl CpuPolicy {
    /// Le CPU est-il saturé (collé à son plafond) ?
    pub fn is_saturated(&self) -> bool {
        self.cur > 0 && self.max > 0 && self.cur >= self.max
    }

    /// Le CPU tourne-t-il au plancher (à ou sous sa fréquence minimale) ?
    pub fn is_at_floor(&self) -> bool {
        self.cur > 0 && self.min > 0 && self.cur <= self.min
    }
}

/// Échec de lecture de la politique d'un CPU
///
/// Transitoire par nature : un CPU en cours de transition hotplug n'expose
/// plus son répertoire cpufreq. L'appelant ignore le CPU pour ce cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    Unavailable,
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Unavailable => write!(f, "politique cpufreq indisponible"),
        }
    }
}

/// Sonde de fréquence par CPU
pub trait FrequencyProbe {
    fn policy(&self, cpu: usize) -> Result<CpuPolicy, ProbeError>;
}

/// Sonde lisant l'interface cpufreq de sysfs
///
/// Lit `cpuN/cpufreq/scaling_cur_freq`, `cpuinfo_min_freq` et
/// `cpuinfo_max_freq` sous la racine donnée (normalement
/// `/sys/devices/system/cpu`).
pub struct SysfsCpufreq {
    root: PathBuf,
}

impl SysfsCpufreq {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_khz(&self, cpu: usize, attr: &str) -> Result<u32, ProbeError> {
        let path = self
            .root
            .join(format!("cpu{cpu}"))
            .join("cpufreq")
            .join(attr);
        let Ok(content) = std::fs::read_to_string(path) else {
            return Err(ProbeError::Unavailable);
        };
        content
            .trim()
            .parse::<u32>()
            .map_err(|_| ProbeError::Unavailable)
    }
}

impl FrequencyProbe for SysfsCpufreq {
    fn policy(&self, cpu: usize) -> Result<CpuPolicy, ProbeError> {
        Ok(CpuPolicy {
            cur: self.read_khz(cpu, "scaling_cur_freq")?,
            min: self.read_khz(cpu, "cpuinfo_min_freq")?,
            max: self.read_khz(cpu, "cpuinfo_max_freq")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn fake_cpu(root: &Path, cpu: usize, cur: u32, min: u32, max: u32) {
        let dir = root.join(format!("cpu{cpu}")).join("cpufreq");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("scaling_cur_freq"), format!("{cur}\n")).unwrap();
        fs::write(dir.join("cpuinfo_min_freq"), format!("{min}\n")).unwrap();
        fs::write(dir.join("cpuinfo_max_freq"), format!("{max}\n")).unwrap();
    }

    fn temp_root(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("tuned-plug-cpufreq-{name}"));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn reads_policy_from_sysfs_tree() {
        let root = temp_root("read");
        fake_cpu(&root, 1, 1_800_000, 300_000, 1_800_000);

        let probe = SysfsCpufreq::new(&root);
        let policy = probe.policy(1).unwrap();
        assert_eq!(policy.cur, 1_800_000);
        assert_eq!(policy.min, 300_000);
        assert_eq!(policy.max, 1_800_000);
        assert!(policy.is_saturated());
        assert!(!policy.is_at_floor());
    }

    #[test]
    fn missing_cpu_is_unavailable() {
        let root = temp_root("missing");
        let probe = SysfsCpufreq::new(&root);
        assert_eq!(probe.policy(3), Err(ProbeError::Unavailable));
    }

    #[test]
    fn garbage_value_is_unavailable() {
        let root = temp_root("garbage");
        let dir = root.join("cpu2").join("cpufreq");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("scaling_cur_freq"), "pas-un-nombre\n").unwrap();

        let probe = SysfsCpufreq::new(&root);
        assert_eq!(probe.policy(2), Err(ProbeError::Unavailable));
    }

    #[test]
    fn floor_detection_requires_nonzero_readings() {
        let at_floor = CpuPolicy {
            cur: 300_000,
            min: 300_000,
            max: 1_800_000,
        };
        assert!(at_floor.is_at_floor());

        let zero_min = CpuPolicy {
            cur: 300_000,
            min: 0,
            max: 1_800_000,
        };
        assert!(!zero_min.is_at_floor());

        let zero_cur = CpuPolicy {
            cur: 0,
            min: 300_000,
            max: 1_800_000,
        };
        assert!(!zero_cur.is_at_floor());
        assert!(!zero_cur.is_saturated());
    }
}
