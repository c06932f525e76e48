use clap::Parser;
use ds18b20::{
    AlarmEvaluator, AlarmSignal, Deadline, DeviceRegistry, HeatAction, Location, SearchKind,
    SharedBus, TemperatureController,
};
use embedded_hal::delay::DelayNs;
use owm_axi::OwMasterBuilder;

mod devmem;

fn parse_hex(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("{s}: {e}"))
}

/// Pause between polling rounds. Huge intervals saturate instead of wrapping.
fn interval_ms(secs: u32) -> u32 {
    secs.saturating_mul(1000)
}

/// Polls DS18B20 sensors on an ow_master 1-Wire bus master
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Physical base address of the peripheral (hex)
    #[arg(short, long, value_parser = parse_hex)]
    base: u64,
    /// Size of the register window in bytes (hex)
    #[arg(short, long, value_parser = parse_hex, default_value = "0x10000")]
    range: u64,
    /// Memory device to access the registers through
    #[arg(long, default_value = "/dev/mem")]
    mem: String,
    /// Seconds between two polling rounds
    #[arg(short, long, default_value_t = 5)]
    interval: u32,
    /// Only enumerate devices with their alarm flag set
    #[arg(long)]
    alarm_search: bool,
    /// Target temperature for every sensor, in °C
    #[arg(short, long)]
    target: Option<f64>,
    /// Allowed deviation from the target, in °C
    #[arg(short, long)]
    flux: Option<f64>,
    /// Number of polling rounds, 0 to run forever
    #[arg(long, default_value_t = 0)]
    rounds: u32,
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    let range = u32::try_from(args.range).expect("Register window larger than 4 GiB");
    // Reach the register bank
    let regs = devmem::DevMem::open(&args.mem, args.base, range)
        .expect("Failed to open the register window");
    let mut delay = linux_embedded_hal::Delay;
    let bus = SharedBus::new(
        OwMasterBuilder::default()
            .with_cancel(Deadline::default())
            .build(regs, linux_embedded_hal::Delay),
    );
    // Enumerate devices on the 1-Wire bus
    let kind = if args.alarm_search {
        SearchKind::Alarmed
    } else {
        SearchKind::Normal
    };
    let mut registry = DeviceRegistry::new();
    match registry.discover(&bus, kind) {
        Ok(roms) => log::info!("Found {} devices", roms.len()),
        Err(e) => {
            log::error!("Search failed: {e}");
            std::process::exit(1);
        }
    }
    if registry.is_empty() {
        log::error!("No sensors to manage");
        std::process::exit(1);
    }
    for sensor in registry.all_sensors_mut() {
        if let Some(target) = args.target {
            sensor.set_target(target);
        }
        if let Some(flux) = args.flux {
            sensor.set_flux(flux);
        }
        log::info!("\n{}", sensor.details());
    }

    let controller = TemperatureController::new(&bus);
    let evaluator = AlarmEvaluator::default();
    let mut round = 0;
    loop {
        for outcome in controller.poll_all(&mut registry, &evaluator) {
            match (outcome.reading, outcome.signal) {
                (Ok((c, f)), signal) => {
                    log::info!("ROM: {}, Temperature: {c}°C / {f}°F", outcome.rom);
                    match signal.and_then(AlarmSignal::heat_action) {
                        Some(HeatAction::On) => log::info!("{}: heat on", outcome.location),
                        Some(HeatAction::Off) => log::info!("{}: heat off", outcome.location),
                        None => {}
                    }
                }
                (Err(e), _) => log::error!("ROM: {}, read failed: {e}", outcome.rom),
            }
        }
        for location in Location::ALL {
            if registry.sensors_for_location(location).next().is_some() {
                log::info!(
                    "{}: {:.3}°C average",
                    location.full_name(),
                    registry.average_for_location(location)
                );
            }
        }
        round += 1;
        if args.rounds != 0 && round >= args.rounds {
            break;
        }
        delay.delay_ms(interval_ms(args.interval));
    }
}
