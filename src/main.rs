use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use docking_autopilot::{
    load_config, spawn_scheduler, Axis, BusActuator, CommandBus, DiagnosticLog, Scheduler,
    SimVehicle, TickMetrics,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("===========================================");
    println!("Starting Docking Autopilot (simulated run)");
    println!("===========================================\n");

    let run_secs: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(10);

    let config = load_config("config/autopilot.toml");

    // Simulated plant with a realistic starting misalignment.
    let sim = SimVehicle::from_config(&config, 42);
    sim.set_offset(Axis::Roll, 12.0);
    sim.set_offset(Axis::Pitch, -7.5);
    sim.set_offset(Axis::Yaw, 4.0);
    sim.set_offset(Axis::X, 60.0);
    sim.set_offset(Axis::Y, 2.4);
    sim.set_offset(Axis::Z, -1.8);

    let bus = CommandBus::new(256);
    let metrics = TickMetrics::new();
    let diagnostics = DiagnosticLog::new(2000);

    let scheduler = Scheduler::from_config(
        &config,
        Box::new(sim.clone()),
        Box::new(BusActuator::new(bus.click_tx.clone())),
        metrics.clone(),
        diagnostics.clone(),
    );
    let (scheduler_handle, stats) = spawn_scheduler(scheduler);

    // Consumer thread: applies bus commands to the plant, like a host
    // adapter pressing real buttons.
    let consumer_handle = {
        let sim = sim.clone();
        let rx = bus.click_rx.clone();
        let stats = stats.clone();
        let metrics = metrics.clone();
        thread::spawn(move || {
            use docking_autopilot::ActuatorPort;
            let mut sim = sim;
            let mut presses = 0u64;
            loop {
                match rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(cmd) => {
                        metrics.record_dispatch(cmd.issued_at.elapsed());
                        sim.press(&cmd.actuator);
                        presses += 1;
                    }
                    Err(crossbeam::channel::RecvTimeoutError::Timeout) => {
                        if stats.shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            presses
        })
    };

    // Plant thread: advances the simulated vehicle in near real time.
    let plant_handle = {
        let sim = sim.clone();
        let stats = stats.clone();
        thread::spawn(move || {
            let step = Duration::from_millis(20);
            while !stats.shutdown.load(Ordering::Relaxed) {
                thread::sleep(step);
                sim.step(step);
            }
        })
    };

    println!("System running for {} seconds...\n", run_secs);
    thread::sleep(Duration::from_secs(run_secs));

    println!("\n===========================================");
    println!("Run completed - initiating shutdown");
    stats.shutdown.store(true, Ordering::Relaxed);

    let scheduler_result = scheduler_handle.join();
    let presses = consumer_handle.join().unwrap_or(0);
    let _ = plant_handle.join();

    if let Ok(Err(err)) = scheduler_result {
        eprintln!("scheduler stopped with error: {}", err);
    }

    let ticks = stats.ticks.load(Ordering::Relaxed);
    let clicks = stats.clicks_issued.load(Ordering::Relaxed);
    let overruns = stats.overruns.load(Ordering::Relaxed);

    println!("===========================================");
    println!("FINAL RESULTS");
    println!("===========================================");
    println!("Ticks: {}", ticks);
    println!("Clicks issued: {} ({} applied)", clicks, presses);
    println!("Tick overruns: {}", overruns);
    println!("Final offsets:");
    for (axis, offset) in sim.offsets() {
        println!("- {:<5} {:+.3}", axis, offset);
    }

    let report = metrics.report();
    println!("\n=== Performance Metrics ===");
    println!("Control P50: {:?}, P99: {:?}", report.control_p50, report.control_p99);
    println!("Tick    P50: {:?}, P99: {:?}", report.tick_p50, report.tick_p99);
    println!("Dispatch P50: {:?}, P99: {:?}", report.dispatch_p50, report.dispatch_p99);
    println!("Tick jitter P99: {:?}", report.jitter_p99);

    println!("\n=== Recent Diagnostics ===");
    for line in diagnostics.tail(5) {
        println!("{}", line);
    }

    let history = sim.history();
    match docking_autopilot::visualization::render_convergence_chart(&history, "convergence.png") {
        Ok(()) => println!("\nWrote convergence.png"),
        Err(err) => eprintln!("\nChart rendering failed: {}", err),
    }
}
