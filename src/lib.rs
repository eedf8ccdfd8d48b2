// Public modules
pub mod cpufreq;
pub mod governor;
pub mod hotplug;
pub mod scheduler;
pub mod status;

// Re-export constants commonly used
pub mod constants {
    /// Borne haute du nombre de CPUs gérés (indices 0..MAX_CPUS-1)
    pub const MAX_CPUS: usize = 8;

    /// Délai de chauffe avant le premier cycle d'évaluation
    pub const WARMUP_DELAY_MS: u64 = 40_000;
    /// Période d'évaluation en régime permanent
    pub const SAMPLING_INTERVAL_MS: u64 = 50;
    /// Pause après chaque mise hors ligne avant le candidat suivant
    pub const SETTLE_DELAY_MS: u64 = 100;

    /// Nombre de cycles consécutifs au plancher à dépasser avant mise hors ligne
    pub const DOWN_STREAK_THRESHOLD: u32 = 30;

    /// Intervalle minimal entre deux écritures du fichier d'état
    pub const STATUS_INTERVAL_SECS: u64 = 1;
}
