use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::{SAMPLING_INTERVAL_MS, STATUS_INTERVAL_SECS, WARMUP_DELAY_MS};
use crate::cpufreq::FrequencyProbe;
use crate::governor::{GovernorHandle, GovernorState};
use crate::hotplug::CpuHotplug;
use crate::status;

/// Limiteur de cadence pour les écritures du fichier d'état (max 1/s)
pub struct Throttle {
    last: Instant,
    min_interval: Duration,
}

impl Throttle {
    pub fn new(min_interval_secs: u64) -> Self {
        Self {
            last: Instant::now() - Duration::from_secs(min_interval_secs),
            min_interval: Duration::from_secs(min_interval_secs),
        }
    }

    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.last) >= self.min_interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

/// Applique le fichier de contrôle à l'interrupteur du gouverneur
///
/// Le fichier joue le rôle du paramètre de module inscriptible de
/// l'original : "0" désactive, "1" active, absent ou autre = inchangé.
fn apply_control(path: &PathBuf, handle: &GovernorHandle) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    match content.trim() {
        "0" => handle.set_active(false),
        "1" => handle.set_active(true),
        _ => {}
    }
}

/// Un battement de la boucle
///
/// Le battement avance toujours (compteur de cycles, fichier d'état) ;
/// seule la politique est conditionnée par l'interrupteur. Désactivé, le
/// gouverneur n'émet aucune demande mais continue de battre.
fn tick(
    state: &mut GovernorState,
    probe: &impl FrequencyProbe,
    hotplug: &mut impl CpuHotplug,
    handle: &GovernorHandle,
    status_path: Option<&PathBuf>,
    control_path: Option<&PathBuf>,
    throttle: &mut Throttle,
) {
    state.cycles = state.cycles.wrapping_add(1);

    if let Some(path) = control_path {
        apply_control(path, handle);
    }

    let active = handle.is_active();
    if active {
        state.evaluate(probe, hotplug);
    }

    if let Some(path) = status_path {
        if throttle.ready() {
            if let Err(e) = status::write(path, state, active) {
                eprintln!("⚠️  écriture du fichier d'état impossible : {e}");
            }
        }
    }
}

/// Boucle périodique du gouverneur
///
/// Réarme toujours le tick suivant avant d'exécuter la politique du tick
/// courant : la boucle avance quelle que soit l'issue du cycle. Tourne sur
/// le thread dédié créé par main.
pub fn run(
    mut state: GovernorState,
    probe: &impl FrequencyProbe,
    hotplug: &mut impl CpuHotplug,
    handle: &GovernorHandle,
    status_path: Option<PathBuf>,
    control_path: Option<PathBuf>,
) {
    // Chauffe : sommeil par tranches pour rester réactif au Ctrl+C
    let warmup_end = Instant::now() + Duration::from_millis(WARMUP_DELAY_MS);
    loop {
        if !handle.is_running() {
            return;
        }
        let remaining = warmup_end.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        thread::sleep(remaining.min(Duration::from_millis(500)));
    }

    state.sync_from(hotplug);
    println!("[PLUG] chauffe terminée, {} cpus en ligne", state.n_active());

    let period = Duration::from_millis(SAMPLING_INTERVAL_MS);
    let mut throttle = Throttle::new(STATUS_INTERVAL_SECS);

    while handle.is_running() {
        // L'échéance suivante est fixée avant le cycle courant : elle ne
        // dépend pas de son issue
        let next_tick = Instant::now() + period;

        tick(
            &mut state,
            probe,
            hotplug,
            handle,
            status_path.as_ref(),
            control_path.as_ref(),
            &mut throttle,
        );

        thread::sleep(next_tick.saturating_duration_since(Instant::now()));
    }
}
