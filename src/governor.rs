use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::constants::{DOWN_STREAK_THRESHOLD, MAX_CPUS, SETTLE_DELAY_MS};
use crate::cpufreq::FrequencyProbe;
use crate::hotplug::{CpuHotplug, HotplugError};

/// Une entrée par CPU possible
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuSlot {
    /// Le CPU participe-t-il actuellement (miroir de l'état plateforme)
    pub active: bool,
    /// Cycles consécutifs observés au plancher de fréquence
    pub idle_streak: u32,
}

/// État du gouverneur, propriété exclusive du thread d'évaluation
///
/// Le CPU 0 est le CPU primaire : il reste actif en permanence et n'est
/// jamais candidat à la mise hors ligne.
pub struct GovernorState {
    pub slots: [CpuSlot; MAX_CPUS],
    /// Battements de la boucle, avancé par le scheduler à chaque tick
    pub cycles: u64,
}

impl GovernorState {
    pub fn new() -> Self {
        let mut slots = [CpuSlot::default(); MAX_CPUS];
        slots[0].active = true;
        Self { slots, cycles: 0 }
    }

    /// Amorce le registre depuis l'état plateforme courant
    pub fn sync_from(&mut self, hotplug: &impl CpuHotplug) {
        for cpu in 1..MAX_CPUS {
            self.slots[cpu].active = hotplug.is_online(cpu);
            self.slots[cpu].idle_streak = 0;
        }
        self.slots[0].active = true;
    }

    pub fn n_active(&self) -> usize {
        self.slots.iter().filter(|s| s.active).count()
    }

    /// Un cycle d'évaluation complet
    ///
    /// À appeler au plus une fois par tick, et seulement si le gouverneur
    /// est actif (c'est l'appelant qui vérifie). Au plus une mise en ligne
    /// par cycle ; zéro ou plusieurs mises hors ligne, chacune gardée par
    /// son propre compteur et absorbée par la pause de stabilisation.
    pub fn evaluate(&mut self, probe: &impl FrequencyProbe, hotplug: &mut impl CpuHotplug) {
        // Un seul décompte par cycle, utilisé par les deux gardes : une
        // mise en ligne pendant la montée ne rouvre pas la descente
        let n_active = self.n_active();

        // Montée : une seule observation de saturation suffit. Le CPU
        // d'indice le plus haut n'en déclenche pas (personne au-dessus de
        // lui à réveiller pour le soulager).
        if n_active < MAX_CPUS {
            for cpu in 0..MAX_CPUS - 1 {
                if !self.slots[cpu].active {
                    continue;
                }
                let Ok(policy) = probe.policy(cpu) else {
                    continue;
                };
                if policy.is_saturated() {
                    self.up_one(hotplug);
                    break;
                }
            }
        }

        // Descente : la série ne compte que des observations de plancher
        // confirmées et consécutives ; tout le reste (au-dessus du minimum,
        // lecture nulle, sonde indisponible) la casse.
        if n_active > 1 {
            for cpu in 1..MAX_CPUS {
                if !self.slots[cpu].active {
                    continue;
                }
                match probe.policy(cpu) {
                    Ok(policy) if policy.is_at_floor() => self.slots[cpu].idle_streak += 1,
                    _ => self.slots[cpu].idle_streak = 0,
                }
            }

            // Balayage du haut vers le bas, jamais sous un seul CPU actif
            while self.n_active() > 1 {
                let candidate = (1..MAX_CPUS).rev().find(|&cpu| {
                    self.slots[cpu].active && self.slots[cpu].idle_streak > DOWN_STREAK_THRESHOLD
                });
                let Some(cpu) = candidate else {
                    break;
                };
                self.down_one(cpu, hotplug);
                thread::sleep(Duration::from_millis(SETTLE_DELAY_MS));
            }
        }
    }

    /// Met en ligne le premier CPU inactif en partant de l'indice 1
    fn up_one(&mut self, hotplug: &mut impl CpuHotplug) {
        for cpu in 1..MAX_CPUS {
            if self.slots[cpu].active {
                continue;
            }
            self.slots[cpu].idle_streak = 0;
            match hotplug.activate(cpu) {
                Ok(()) => {
                    self.slots[cpu].active = true;
                    println!("[PLUG] UP cpu {cpu}");
                }
                Err(HotplugError::AlreadyOnline) => self.slots[cpu].active = true,
                Err(e) => eprintln!("⚠️  UP cpu {cpu} impossible : {e}"),
            }
            return;
        }
    }

    /// Met hors ligne le CPU donné
    ///
    /// La série est remise à zéro quelle que soit l'issue : après un refus
    /// de la plateforme, un CPU durablement au plancher devra de nouveau
    /// dépasser le seuil avant la prochaine tentative.
    fn down_one(&mut self, cpu: usize, hotplug: &mut impl CpuHotplug) {
        self.slots[cpu].idle_streak = 0;
        match hotplug.deactivate(cpu) {
            Ok(()) => {
                self.slots[cpu].active = false;
                println!("[PLUG] DOWN cpu {cpu}");
            }
            Err(HotplugError::AlreadyOffline) => self.slots[cpu].active = false,
            Err(e) => eprintln!("⚠️  DOWN cpu {cpu} impossible : {e}"),
        }
    }
}

impl Default for GovernorState {
    fn default() -> Self {
        Self::new()
    }
}

/// Poignée partageable vers les deux interrupteurs du daemon
///
/// `active` est le seul état mutable depuis l'extérieur du thread
/// d'évaluation : il ne conditionne que la prise d'action d'un cycle,
/// jamais sa justesse. `running` est posé à faux par le handler Ctrl+C.
#[derive(Clone)]
pub struct GovernorHandle {
    active: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl GovernorHandle {
    pub fn new(active: bool) -> Self {
        Self {
            active: Arc::new(AtomicBool::new(active)),
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
