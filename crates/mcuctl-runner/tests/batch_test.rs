//! Batch runner and self-test against stand-in shells.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use mcuctl_link::transport::{CommandLog, ScriptedTransport, SimulatedTransport};
use mcuctl_link::{Board, ChannelConfig, CommandChannel};
use mcuctl_runner::{BatchOptions, BatchRunner, RunnerError, SelfTest};

fn channel(transport: ScriptedTransport) -> (CommandChannel, CommandLog) {
    let log = transport.log();
    let config = ChannelConfig::default().for_batch();
    (CommandChannel::new(Box::new(transport), config), log)
}

fn runner(stop_on_error: bool) -> BatchRunner {
    BatchRunner::new(BatchOptions { stop_on_error })
}

#[test]
fn test_batch_counts_severities() {
    let transport = ScriptedTransport::new()
        .reply("TM4C1294 hardware demo\nFirmware 1.0")
        .reply("OK: LEDs set to 0x0f.")
        .reply("WARNING: Nothing to read")
        .reply("ERROR: Unknown command")
        .reply("OK: RGB set.");
    let (mut channel, log) = channel(transport);

    let script = "\
# demo script
info
led 0x0f   # all on

uart r 6 a
bogus
delay 10
rgb 0xff0000
";
    let summary = runner(false).run(&mut channel, Cursor::new(script)).unwrap();

    assert_eq!(summary.lines, 8);
    assert_eq!(summary.internal_commands, 1);
    assert_eq!(summary.device_commands, 5);
    assert_eq!(summary.not_evaluated, 1);
    assert_eq!(summary.ok, 2);
    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.stopped_at, None);
    assert!(!summary.is_success());
    assert_eq!(
        log.commands(),
        vec!["info", "led 0x0f", "uart r 6 a", "bogus", "rgb 0xff0000"]
    );
}

#[test]
fn test_batch_stop_on_error() {
    let transport = ScriptedTransport::new()
        .reply("OK: LEDs set to 0x01.")
        .reply("FATAL: Bus fault")
        .reply("OK: LEDs set to 0x02.");
    let (mut channel, log) = channel(transport);

    let script = "led 0x01\ni2c w 2 0x40 0 0x01\nled 0x02\n";
    let summary = runner(true).run(&mut channel, Cursor::new(script)).unwrap();

    assert_eq!(summary.errors, 1);
    assert_eq!(summary.stopped_at, Some(2));
    assert_eq!(summary.lines, 2);
    assert_eq!(log.len(), 2);
}

#[test]
fn test_batch_missing_delay_is_counted() {
    let transport = ScriptedTransport::new().reply("OK: LEDs set to 0x01.");
    let (mut channel, _log) = channel(transport);

    let summary = runner(false)
        .run(&mut channel, Cursor::new("delay\nled 0x01\n"))
        .unwrap();
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.ok, 1);

    let (mut channel, log) = self::channel(ScriptedTransport::new().reply("OK"));
    let summary = runner(true)
        .run(&mut channel, Cursor::new("delay\nled 0x01\n"))
        .unwrap();
    assert_eq!(summary.stopped_at, Some(1));
    assert!(log.is_empty());
}

#[test]
fn test_batch_exit_stops_reading() {
    let transport = ScriptedTransport::new().reply("OK: LEDs set to 0x01.");
    let (mut channel, log) = channel(transport);

    let summary = runner(false)
        .run(&mut channel, Cursor::new("led 0x01\nexit\nled 0x02\n"))
        .unwrap();
    assert_eq!(summary.lines, 2);
    assert_eq!(summary.internal_commands, 1);
    assert_eq!(log.commands(), vec!["led 0x01"]);
    assert!(summary.is_success());
}

#[test]
fn test_batch_sends_lcd_text_with_hash() {
    let transport = ScriptedTransport::new().reply("OK");
    let (mut channel, log) = channel(transport);

    runner(false)
        .run(&mut channel, Cursor::new("lcd text 10 10 0xffffff 0 Item #1\n"))
        .unwrap();
    assert_eq!(log.last().as_deref(), Some("lcd text 10 10 0xffffff 0 Item #1"));
}

#[test]
fn test_batch_missing_prompt_counts_error() {
    let transport = ScriptedTransport::new()
        .reply_without_prompt("OK. Data: 0x12")
        .reply("OK: LEDs set to 0x01.");
    let (mut channel, _log) = channel(transport);

    let summary = runner(false)
        .run(&mut channel, Cursor::new("adc\nled 0x01\n"))
        .unwrap();
    assert_eq!(summary.device_commands, 2);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.ok, 1);
}

#[test]
fn test_batch_stop_flag() {
    let (mut channel, log) = channel(ScriptedTransport::new().reply("OK"));
    let stop = Arc::new(AtomicBool::new(true));

    let summary = runner(false)
        .with_stop_flag(stop)
        .run(&mut channel, Cursor::new("led 0x01\n"))
        .unwrap();
    assert!(summary.interrupted);
    assert_eq!(summary.lines, 0);
    assert!(log.is_empty());
}

#[test]
fn test_batch_file_not_found() {
    let (mut channel, _log) = channel(ScriptedTransport::new());
    let err = runner(false)
        .run_file(&mut channel, Path::new("/nonexistent/demo.txt"))
        .unwrap_err();
    match err {
        RunnerError::BatchFile { path, .. } => assert_eq!(path, Path::new("/nonexistent/demo.txt")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_self_test_on_simulated_board() {
    let channel =
        CommandChannel::new(Box::new(SimulatedTransport::new()), ChannelConfig::default()).into_shared();
    let mut test = SelfTest::new(Board::new(channel)).with_pause(Duration::ZERO);
    let report = test.run();

    // simulated replies carry no data, so every read step fails
    assert!(report.passed.iter().any(|step| step == "info"));
    assert!(report.passed.iter().any(|step| step == "RGB LED"));
    assert!(report.failures.iter().any(|(step, _)| step == "ADC"));
    assert_eq!(report.passed.len() + report.failures.len(), 13);
    assert!(!report.is_success());
}
