//! Keypad-to-program integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use dsky_core::{
    CallState, ConsoleConfig, Dsky, Hardware, HeadlessConsole, Interpreter, KeyboardMode,
    LogicalKey, Program, ProgramContext, ProgramEntry, ProgramRegistry, RunState, NOT_USED,
};
use proptest::prelude::*;

#[derive(Default)]
struct Log {
    calls: Vec<(&'static str, CallState)>,
    data: Vec<(&'static str, u8, i32)>,
}

type SharedLog = Rc<RefCell<Log>>;

/// Takes `wanted` operands, then reports NOT_RUNNING.
struct Echo {
    name: &'static str,
    log: SharedLog,
    wanted: u8,
}

impl Program for Echo {
    fn name(&self) -> &str {
        self.name
    }

    fn call(&mut self, call: CallState, _ctx: &mut ProgramContext<'_>) -> RunState {
        self.log.borrow_mut().calls.push((self.name, call));
        match call {
            CallState::PushToBackground => RunState::Background,
            CallState::Stop | CallState::Pause => RunState::NotRunning,
            _ => RunState::Foreground,
        }
    }

    fn accepts_data(&self) -> bool {
        true
    }

    fn submit_data(&mut self, index: u8, value: i32, _ctx: &mut ProgramContext<'_>) -> RunState {
        self.log.borrow_mut().data.push((self.name, index, value));
        if index + 1 >= self.wanted {
            RunState::NotRunning
        } else {
            RunState::Foreground
        }
    }
}

fn echo(name: &'static str, log: &SharedLog, wanted: u8) -> Echo {
    Echo {
        name,
        log: log.clone(),
        wanted,
    }
}

fn interpreter(log: &SharedLog) -> Interpreter {
    let registry = ProgramRegistry::new(
        vec![
            ProgramEntry::new(35, NOT_USED, echo("v35", log, 10)),
            ProgramEntry::meta(34, dsky_core::MetaProgram::TerminateCurrent),
            ProgramEntry::meta(32, dsky_core::MetaProgram::ResetCurrent),
            ProgramEntry::meta(30, dsky_core::MetaProgram::BringToForeground { verb: None }),
            ProgramEntry::new(16, Some(36), echo("v16n36", log, 10)),
            ProgramEntry::new(16, Some(43), echo("v16n43", log, 10)),
            ProgramEntry::new(21, Some(98), echo("v21n98", log, 1)),
        ],
        Hardware::default(),
    );
    Interpreter::new(registry)
}

/// Feed a key script, releasing between presses.
fn type_keys(i: &mut Interpreter, keys: &str) {
    let mut now = i.registry().now_ms();
    for ch in keys.chars() {
        now += 10;
        i.tick(LogicalKey::from_char(ch), now);
        now += 10;
        i.tick(LogicalKey::None, now);
    }
}

fn foreground_count(i: &Interpreter) -> usize {
    i.registry()
        .entries()
        .iter()
        .filter(|e| e.run_state() == RunState::Foreground)
        .count()
}

#[test]
fn test_digits_submit_decimal_value() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v35 123 ");
    assert_eq!(log.borrow().data, vec![("v35", 0, 123)]);
}

#[test]
fn test_verb_only_dispatch() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v35 ");
    assert_eq!(i.registry().run_state_of(35, NOT_USED), Some(RunState::Foreground));
    assert_eq!(i.keyboard().mode(), KeyboardMode::NumberEntry);
}

#[test]
fn test_verb_noun_dispatch_demotes_previous() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v35 v16n36 ");
    assert_eq!(i.registry().run_state_of(16, Some(36)), Some(RunState::Foreground));
    assert_eq!(i.registry().run_state_of(35, NOT_USED), Some(RunState::Background));
    assert_eq!(
        log.borrow().calls,
        vec![
            ("v35", CallState::BringToForeground),
            ("v16n36", CallState::BringToForeground),
            ("v35", CallState::PushToBackground),
        ]
    );
}

#[test]
fn test_reset_current_calls_foreground_once() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v16n43 ");
    log.borrow_mut().calls.clear();
    type_keys(&mut i, "v32 ");
    assert_eq!(log.borrow().calls, vec![("v16n43", CallState::Reset)]);
    assert_eq!(i.registry().run_state_of(16, Some(43)), Some(RunState::Foreground));
}

#[test]
fn test_terminate_current_calls_foreground_once() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v16n43 ");
    log.borrow_mut().calls.clear();
    type_keys(&mut i, "v34 ");
    assert_eq!(log.borrow().calls, vec![("v16n43", CallState::Stop)]);
    assert_eq!(i.registry().run_state_of(16, Some(43)), Some(RunState::NotRunning));
    assert_eq!(foreground_count(&i), 0);
}

#[test]
fn test_finished_program_gets_no_more_data() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v21n98 2 ");
    assert_eq!(i.keyboard().mode(), KeyboardMode::NoEntry);
    assert_eq!(i.keyboard().accumulator().index(), 0);

    type_keys(&mut i, "5 ");
    type_keys(&mut i, "7 ");
    assert_eq!(log.borrow().data, vec![("v21n98", 0, 2)]);
}

#[test]
fn test_multi_operand_entry() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v35 1 -2 3- ");
    assert_eq!(
        log.borrow().data,
        vec![("v35", 0, 1), ("v35", 1, -2), ("v35", 2, -3)]
    );
    assert_eq!(i.keyboard().accumulator().index(), 3);
}

#[test]
fn test_leading_minus_with_several_digits_gives_minus_eight() {
    // The pending sign lands on the first digit; later digits add to -1.
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v35 -12 1-2 12- ");
    assert_eq!(
        log.borrow().data,
        vec![("v35", 0, -8), ("v35", 1, -8), ("v35", 2, -12)]
    );
}

#[test]
fn test_bring_to_foreground_from_keypad() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v16n43 v35 ");
    assert_eq!(i.registry().run_state_of(16, Some(43)), Some(RunState::Background));

    type_keys(&mut i, "v30 16 43 ");
    assert_eq!(i.registry().run_state_of(16, Some(43)), Some(RunState::Foreground));
    assert_eq!(i.registry().run_state_of(30, NOT_USED), Some(RunState::NotRunning));
    assert_eq!(foreground_count(&i), 1);
    assert_eq!(i.keyboard().mode(), KeyboardMode::NoEntry);
}

#[test]
fn test_unknown_codes_fall_back_to_no_entry() {
    let log = SharedLog::default();
    let mut i = interpreter(&log);
    type_keys(&mut i, "v99 ");
    assert_eq!(i.keyboard().mode(), KeyboardMode::NoEntry);
    type_keys(&mut i, "v16n99 ");
    assert_eq!(i.keyboard().mode(), KeyboardMode::NoEntry);
    assert!(log.borrow().calls.is_empty());
}

#[test]
fn test_standard_table_session() {
    let config = ConsoleConfig::from_json(
        r#"{"startTime": "2018-07-20T20:17:40",
            "gps": {"latitude": 28.5, "longitude": -80.75, "altitude": 3.0,
                    "hour": 13, "minute": 32, "second": 0}}"#,
    )
    .unwrap();
    let fallback = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap();
    let console = HeadlessConsole::with_keys("v25n36 9 30 0 ");
    let mut d = Dsky::from_config(console, &config, fallback);
    d.run(Some(40));

    let registry = d.interpreter().registry();
    assert_eq!(registry.run_state_of(16, Some(36)), Some(RunState::Foreground));
    let frame = d.console().last_frame().unwrap();
    let shown = frame.display.unwrap();
    assert_eq!((shown.verb, shown.noun), (16, 36));
    assert_eq!((shown.r1, shown.r2), (9, 30));

    d.console_mut().queue_string("v16n43 ");
    d.run(Some(20));
    let shown = d.console().last_frame().unwrap().display.unwrap();
    assert_eq!((shown.r1, shown.r2, shown.r3), (28_050, -80_075, 3));
}

proptest! {
    #[test]
    fn prop_single_digit_sign_either_side(digit in 1u8..=9) {
        let log = SharedLog::default();
        let mut i = interpreter(&log);
        type_keys(&mut i, &format!("v35 -{d} {d}- ", d = digit));
        let expected = -i32::from(digit);
        prop_assert_eq!(&log.borrow().data, &vec![("v35", 0u8, expected), ("v35", 1u8, expected)]);
    }

    #[test]
    fn prop_trailing_minus_negates_whole_value(digits in "[1-9][0-9]{0,8}") {
        let expected = -digits.parse::<i32>().unwrap();
        let log = SharedLog::default();
        let mut i = interpreter(&log);
        type_keys(&mut i, &format!("v35 {}- ", digits));
        prop_assert_eq!(&log.borrow().data, &vec![("v35", 0u8, expected)]);
    }

    #[test]
    fn prop_at_most_one_foreground(script in proptest::collection::vec(
        prop_oneof![
            Just("v35 "),
            Just("v16n36 "),
            Just("v16n43 "),
            Just("v21n98 "),
            Just("v34 "),
            Just("v32 "),
            Just("v30 16 43 "),
            Just("v30 35 "),
            Just("4 "),
        ],
        1..12,
    )) {
        let log = SharedLog::default();
        let mut i = interpreter(&log);
        for keys in script {
            type_keys(&mut i, keys);
            prop_assert!(foreground_count(&i) <= 1);
        }
    }
}
