use embedded_hal_mock::eh1::delay::NoopDelay;
use owm_axi::{
    Cancel, FamilyConfig, OneWireError, OwMaster, OwMasterBuilder, ROM_TABLE_SLOTS, RomCode, SearchKind,
    mock::{SimDevice, SimPeripheral},
};
use owm_protocol::consts::*;
use std::collections::HashSet;

fn three_sensors() -> Vec<SimDevice> {
    vec![
        SimDevice::ds18b20(0x0000_0416_6401, 0x0190),
        SimDevice::ds18b20(0x0000_0416_6402, 0x0191),
        SimDevice::ds18b20(0x0000_0416_6403, 0x0192),
    ]
}

struct AlwaysCancelled;

impl Cancel for AlwaysCancelled {
    fn cancelled(&self) -> bool {
        true
    }
}

#[test]
fn reset_pulse_sees_presence() {
    let mut sim = SimPeripheral::new(three_sensors());
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    assert!(!bus.is_initialized());
    assert_eq!(bus.reset_pulse(), Ok(()));
    assert!(bus.is_initialized());
    assert_eq!(sim.control_writes(), vec![CTRL_RESET_PULSE]);
}

#[test]
fn reset_pulse_gives_up_after_retry_budget() {
    let mut sim = SimPeripheral::new(three_sensors());
    sim.presence = false;
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    assert_eq!(bus.reset_pulse(), Err(OneWireError::NoPresencePulse));
    assert!(!bus.is_initialized());
    // one immediate read plus 20 re-polls
    assert_eq!(sim.status_reads(), 21);
}

#[test]
fn custom_retry_budget_reads_status_once_more() {
    let mut sim = SimPeripheral::new(three_sensors());
    sim.presence = false;
    let mut bus = OwMasterBuilder::default()
        .with_retries(5)
        .build(&mut sim, NoopDelay::new());
    assert_eq!(bus.reset_pulse(), Err(OneWireError::NoPresencePulse));
    assert_eq!(sim.status_reads(), 6);
}

#[test]
fn slow_peripheral_is_polled_until_done() {
    let mut sim = SimPeripheral::new(three_sensors());
    sim.latency = 7;
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    assert_eq!(bus.reset_pulse(), Ok(()));
    assert_eq!(sim.status_reads(), 8);
}

#[test]
fn latency_beyond_budget_times_out() {
    let mut sim = SimPeripheral::new(three_sensors());
    sim.latency = 30;
    let mut bus = OwMasterBuilder::default()
        .with_retries(5)
        .build(&mut sim, NoopDelay::new());
    assert_eq!(bus.reset_pulse(), Err(OneWireError::NoPresencePulse));
    assert_eq!(sim.status_reads(), 6);
}

#[test]
fn match_rom_requires_reset() {
    let devices = three_sensors();
    let rom = devices[0].rom;
    let mut sim = SimPeripheral::new(devices);
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    assert_eq!(bus.match_rom(rom), Err(OneWireError::BusUninitialized));
    assert!(sim.writes().is_empty());
}

#[test]
fn match_rom_writes_code_across_both_halves() {
    let devices = three_sensors();
    let rom = devices[1].rom;
    let mut sim = SimPeripheral::new(devices);
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    bus.reset_pulse().unwrap();
    assert_eq!(bus.match_rom(rom), Ok(()));
    assert_eq!(
        &sim.writes()[1..],
        &[
            (REG_COMMAND, MATCH_ROM as u32),
            (REG_WRITE_SIZE, 64),
            (REG_WRITE_DATA_LO, rom.lo()),
            (REG_WRITE_DATA_HI, rom.hi()),
            (REG_CONTROL, CTRL_EXEC_WITHOUT_PULLUP),
        ]
    );
}

#[test]
fn unknown_rom_is_not_acknowledged_and_breaks_the_sequence() {
    let mut sim = SimPeripheral::new(three_sensors());
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    bus.reset_pulse().unwrap();
    assert_eq!(
        bus.match_rom(RomCode::new(0xdead_beef)),
        Err(OneWireError::NotAcknowledged)
    );
    assert_eq!(
        bus.convert_temperature(),
        Err(OneWireError::BusUninitialized)
    );
}

#[test]
fn full_read_sequence_leaves_temperature_in_read_data() {
    let devices = three_sensors();
    let rom = devices[2].rom;
    let mut sim = SimPeripheral::new(devices);
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    bus.reset_pulse().unwrap();
    bus.match_rom(rom).unwrap();
    assert_eq!(bus.convert_temperature(), Ok(()));
    bus.reset_pulse().unwrap();
    bus.match_rom(rom).unwrap();
    assert_eq!(bus.read_scratchpad(), Ok(()));
    let word = bus.read_data_lo().unwrap();
    assert_eq!(word & 0xffff, 0x0192);
    assert_eq!(bus.read_data().unwrap()[0], word);
    assert!(!bus.is_initialized());
    assert_eq!(
        sim.control_writes(),
        vec![
            CTRL_RESET_PULSE,
            CTRL_EXEC_WITHOUT_PULLUP,
            CTRL_EXEC_WITH_PULLUP,
            CTRL_RESET_PULSE,
            CTRL_EXEC_WITHOUT_PULLUP,
            CTRL_READ_TIMESLOTS,
        ]
    );
    assert!(sim.writes().contains(&(REG_READ_SIZE, 72)));
    assert!(sim.writes().contains(&(REG_COMMAND, CONVERT_TEMP as u32)));
    assert!(sim.writes().contains(&(REG_COMMAND, SCRATCH_READ as u32)));
}

#[test]
fn conversion_must_report_command_done_only() {
    let devices = three_sensors();
    let rom = devices[0].rom;
    let mut sim = SimPeripheral::new(devices);
    sim.convert_ok = false;
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    bus.reset_pulse().unwrap();
    bus.match_rom(rom).unwrap();
    assert_eq!(
        bus.convert_temperature(),
        Err(OneWireError::ConversionIncomplete(0))
    );
    // sampled once, no poll loop
    assert_eq!(sim.status_reads(), 3);
}

#[test]
fn scratchpad_read_times_out() {
    let devices = three_sensors();
    let rom = devices[0].rom;
    let mut sim = SimPeripheral::new(devices);
    sim.read_ok = false;
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    bus.reset_pulse().unwrap();
    bus.match_rom(rom).unwrap();
    assert_eq!(bus.read_scratchpad(), Err(OneWireError::ReadTimeout));
}

#[test]
fn search_yields_each_discovered_rom_once() {
    let devices = three_sensors();
    let expected: Vec<RomCode> = devices.iter().map(|d| d.rom).collect();
    let mut sim = SimPeripheral::new(devices);
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    let mut search = bus.search(SearchKind::Normal).unwrap();
    assert_eq!(search.discovered(), 3);
    assert_eq!(search.len(), 3);
    let first = search.next().unwrap().unwrap();
    let rest: Vec<RomCode> = search.map(Result::unwrap).collect();
    let found: Vec<RomCode> = std::iter::once(first).chain(rest).collect();
    assert_eq!(found, expected);
    assert_eq!(found.iter().collect::<HashSet<_>>().len(), 3);
    assert!(found.iter().all(RomCode::crc_valid));

    assert!(!bus.search_in_progress());
    assert_eq!(bus.num_roms(), 3);
    assert_eq!(bus.rom_at(1), Some(expected[1]));
    assert_eq!(bus.rom_at(3), None);
    assert_eq!(bus.rom_codes().collect::<Vec<_>>(), expected);
    assert!(!bus.is_initialized());
    assert_eq!(
        &sim.writes()[..2],
        &[(REG_COMMAND, SEARCH_ROM as u32), (REG_CONTROL, CTRL_SERIALIZE)]
    );
}

#[test]
fn search_is_in_progress_until_exhausted() {
    let mut sim = SimPeripheral::new(three_sensors());
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    {
        let mut search = bus.search(SearchKind::Normal).unwrap();
        search.next();
        drop(search);
    }
    assert!(!bus.search_in_progress());
    assert_eq!(bus.num_roms(), 1);
    assert_eq!(bus.reset_pulse(), Ok(()));
}

#[test]
fn repeated_search_rebuilds_the_table() {
    let mut sim = SimPeripheral::new(three_sensors());
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    let first: Vec<_> = bus.search(SearchKind::Normal).unwrap().collect();
    let second: Vec<_> = bus.search(SearchKind::Normal).unwrap().collect();
    assert_eq!(first, second);
    assert_eq!(bus.num_roms(), 3);
}

#[test]
fn table_grows_past_reserved_slots() {
    let devices: Vec<SimDevice> = (0..ROM_TABLE_SLOTS as u64 + 4)
        .map(|_| SimDevice::ds18b20(rand::random::<u64>(), 0x0190))
        .collect();
    let mut sim = SimPeripheral::new(devices.clone());
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    let found: Vec<RomCode> = bus
        .search(SearchKind::Normal)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(found.len(), ROM_TABLE_SLOTS + 4);
    assert_eq!(bus.num_roms(), ROM_TABLE_SLOTS + 4);
    assert_eq!(bus.rom_at(ROM_TABLE_SLOTS + 3), Some(devices[ROM_TABLE_SLOTS + 3].rom));
}

#[test]
fn search_without_responders_is_a_protocol_error() {
    let mut sim = SimPeripheral::new(Vec::new());
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    assert!(matches!(
        bus.search(SearchKind::Normal),
        Err(OneWireError::SearchProtocol)
    ));
    assert!(!bus.search_in_progress());
}

#[test]
fn search_memory_error_aborts() {
    let mut sim = SimPeripheral::new(three_sensors());
    sim.search_memory_error = true;
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    assert!(matches!(
        bus.search(SearchKind::Normal),
        Err(OneWireError::SearchMemory)
    ));
    assert!(!bus.search_in_progress());
}

#[test]
fn search_reads_count_even_without_done_bit() {
    let mut sim = SimPeripheral::new(three_sensors());
    sim.search_completes = false;
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    let found = bus.search(SearchKind::Normal).unwrap().count();
    assert_eq!(found, 3);
    // one immediate read plus 30 re-polls
    assert_eq!(sim.status_reads(), 31);
}

#[test]
fn alarm_search_only_reports_alarmed_devices() {
    let mut devices = three_sensors();
    devices[1] = devices[1].clone().alarmed();
    let alarmed = devices[1].rom;
    let mut sim = SimPeripheral::new(devices);
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    let found: Vec<_> = bus
        .search(SearchKind::Alarmed)
        .unwrap()
        .map(Result::unwrap)
        .collect();
    assert_eq!(found, vec![alarmed]);
    assert_eq!(sim.writes()[0], (REG_COMMAND, ALARM_SEARCH as u32));
}

#[test]
fn cancel_hook_stops_polling() {
    let mut sim = SimPeripheral::new(three_sensors());
    sim.presence = false;
    let mut bus = OwMasterBuilder::default()
        .with_cancel(AlwaysCancelled)
        .build(&mut sim, NoopDelay::new());
    assert_eq!(bus.reset_pulse(), Err(OneWireError::Cancelled));
    assert_eq!(sim.status_reads(), 1);
}

#[test]
#[should_panic(expected = "search is in progress")]
fn interleaving_with_a_search_panics() {
    let mut sim = SimPeripheral::new(three_sensors());
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    let search = bus.search(SearchKind::Normal).unwrap();
    std::mem::forget(search);
    let _ = bus.reset_pulse();
}

#[test]
fn scratchpad_follows_device_temperature() {
    let devices = three_sensors();
    let rom = devices[0].rom;
    let mut sim = SimPeripheral::new(devices);
    sim.set_raw_temp(rom, 0x0550);
    let mut bus = OwMaster::new(&mut sim, NoopDelay::new());
    bus.reset_pulse().unwrap();
    bus.match_rom(rom).unwrap();
    bus.read_scratchpad().unwrap();
    assert_eq!(bus.read_data_lo().unwrap() & 0xffff, 0x0550);
    assert!(bus.status().unwrap().read_done());
}

#[test]
fn search_command_comes_from_the_family_table() {
    let mut family = FamilyConfig::DS18B20;
    family.rom_commands.search_rom = 0xf1;
    let mut sim = SimPeripheral::new(three_sensors());
    let mut bus = OwMasterBuilder::default()
        .with_family(family)
        .build(&mut sim, NoopDelay::new());
    // the simulated devices ignore the unknown byte
    assert_eq!(bus.search(SearchKind::Normal).unwrap().count(), 0);
    assert_eq!(sim.writes()[0], (REG_COMMAND, 0xf1));
}
