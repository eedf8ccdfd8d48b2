use std::path::PathBuf;
use std::thread::JoinHandle;

use toml::Table;

use tuned_plug::constants::{SAMPLING_INTERVAL_MS, WARMUP_DELAY_MS};
use tuned_plug::cpufreq::SysfsCpufreq;
use tuned_plug::governor::{GovernorHandle, GovernorState};
use tuned_plug::hotplug::SysfsHotplug;
use tuned_plug::scheduler;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = std::env::args()
        .nth(1)
        .map(std::fs::read_to_string)
        .unwrap_or(Ok("".to_string()))?
        .parse::<Table>()?;

    let governor = config.get("governor").and_then(|t| t.as_table());
    let active = governor
        .and_then(|t| t.get("active"))
        .ok_or("is missing")
        .and_then(|v| v.as_bool().ok_or("must be a boolean"))
        .unwrap_or_else(|s| {
            println!("governor.active {s}, replaced with the default value of true");
            true
        });

    let paths = config.get("paths").and_then(|t| t.as_table());
    let sysfs_root = paths
        .and_then(|t| t.get("sysfs-root"))
        .ok_or("is missing")
        .and_then(|v| v.as_str().ok_or("must be a string"))
        .map(PathBuf::from)
        .unwrap_or_else(|s| {
            println!("paths.sysfs-root {s}, replaced with the default of /sys/devices/system/cpu");
            PathBuf::from("/sys/devices/system/cpu")
        });
    // empty string = status file disabled
    let status = paths
        .and_then(|t| t.get("status"))
        .ok_or("is missing")
        .and_then(|v| v.as_str().ok_or("must be a string"))
        .map(str::to_string)
        .unwrap_or_else(|s| {
            println!("paths.status {s}, replaced with the default of /run/tuned-plug/status.json");
            "/run/tuned-plug/status.json".to_string()
        });
    let status_path = (!status.is_empty()).then(|| PathBuf::from(status));
    // empty string = runtime control file disabled
    let control = paths
        .and_then(|t| t.get("control"))
        .ok_or("is missing")
        .and_then(|v| v.as_str().ok_or("must be a string"))
        .map(str::to_string)
        .unwrap_or_else(|s| {
            println!("paths.control {s}, replaced with the default of /run/tuned-plug/active");
            "/run/tuned-plug/active".to_string()
        });
    let control_path = (!control.is_empty()).then(|| PathBuf::from(control));

    println!("🚀 Démarrage du daemon tuned-plug");
    println!("📍 Racine sysfs: {}", sysfs_root.display());
    println!(
        "⏱️  Premier cycle dans {} s, puis toutes les {} ms",
        WARMUP_DELAY_MS / 1000,
        SAMPLING_INTERVAL_MS
    );
    if !active {
        println!("ℹ️  Gouverneur démarré désactivé (governor.active = false)");
    }

    let handle = GovernorHandle::new(active);

    // Gérer Ctrl+C proprement
    let h = handle.clone();
    ctrlc::set_handler(move || {
        println!("\n🛑 Arrêt du daemon...");
        h.shutdown();
    })
    .expect("Erreur lors de la configuration du handler Ctrl+C");

    let state = GovernorState::new();
    let probe = SysfsCpufreq::new(sysfs_root.clone());
    let mut hotplug = SysfsHotplug::new(sysfs_root);

    let jh: JoinHandle<()> = std::thread::Builder::new()
        .name("tunedplug".to_string())
        .spawn(move || {
            scheduler::run(state, &probe, &mut hotplug, &handle, status_path, control_path)
        })?;

    jh.join().unwrap();
    Ok(())
}
