//! Integration tests for the line → authn → authz → dispatch → interlock chain.

use crate::mock::{PASSWD, RecordingSink, make_service};

use breakerd::adapters::credentials::MemoryCredentialStore;
use breakerd::app::events::AppEvent;
use breakerd::protocol::parser::ParseMode;
use breakerd::safety::TripEvent;
use breakerd::{AppService, CommandError, Register, RegisterBank, ServiceOptions};

fn voltage_of(bank: &RegisterBank) -> u8 {
    bank.load(Register::Voltage)
}

#[test]
fn admin_set_voltage_out_of_range_trips_breaker() {
    let app = make_service();
    let mut sink = RecordingSink::new();

    let out = app.handle_line("auth seth zzz set voltage 100", &mut sink);
    assert_eq!(out.wire_text(), "OK");
    assert!(!out.close_session);

    let bank = app.snapshot();
    assert_eq!(voltage_of(&bank), 100);
    assert_eq!(bank.load(Register::CircuitBreaker), 0, "interlock must open the breaker");
    assert!(sink.events.contains(&AppEvent::BreakerTripped(TripEvent {
        voltage: 100,
        min_voltage: 235,
        max_voltage: 245,
    })));
}

#[test]
fn bad_password_leaves_registers_alone() {
    let app = make_service();
    let mut sink = RecordingSink::new();

    let out = app.handle_line("auth seth wrongpw nop", &mut sink);
    assert_eq!(out.wire_text(), "Bad password!");
    assert_eq!(app.snapshot(), RegisterBank::new());
    assert_eq!(sink.executed(), 0);
}

#[test]
fn unknown_user_reply() {
    let app = make_service();
    let out = app.handle_line("auth nouser x nop", &mut RecordingSink::new());
    assert_eq!(out.wire_text(), "Unknown user!");
}

#[test]
fn low_privilege_set_is_denied() {
    let app = make_service();
    let out = app.handle_line("auth bob pw set voltage 1", &mut RecordingSink::new());
    assert_eq!(out.wire_text(), "Authorization required!");
    assert_eq!(app.register(Register::Voltage.id()), 240);
}

#[test]
fn low_privilege_nop_and_exit_are_allowed() {
    let app = make_service();
    assert_eq!(app.handle_line("auth guest guest nop", &mut RecordingSink::new()).reply, Ok(()));
    let out = app.handle_line("auth bob pw exit", &mut RecordingSink::new());
    assert_eq!(out.reply, Ok(()));
    assert!(out.close_session);
}

#[test]
fn exit_skips_the_interlock() {
    let mut bank = RegisterBank::new();
    bank.store(Register::Voltage, 10);
    let app = AppService::with_bank(
        MemoryCredentialStore::parse(PASSWD),
        bank,
        ServiceOptions::default(),
    );
    let mut sink = RecordingSink::new();

    let out = app.handle_line("auth seth zzz exit", &mut sink);
    assert!(out.close_session);
    assert_eq!(sink.trips(), 0);
    assert_eq!(app.register(Register::CircuitBreaker.id()), 1, "breaker still armed");

    // The next accepted command runs the pass and catches it.
    app.handle_line("auth bob pw nop", &mut sink);
    assert_eq!(sink.trips(), 1);
}

#[test]
fn breaker_round_trip() {
    let app = make_service();
    let mut sink = RecordingSink::new();

    app.handle_line("auth seth zzz set circuit_breaker 1", &mut sink);
    app.handle_line("auth seth zzz set voltage 250", &mut sink);
    assert_eq!(app.register(Register::CircuitBreaker.id()), 0);

    assert_eq!(app.run_interlock(&mut sink), None);
    assert_eq!(app.register(Register::CircuitBreaker.id()), 0);
    assert_eq!(sink.trips(), 1);
}

#[test]
fn rejected_lines_emit_rejection_events() {
    let app = make_service();
    let mut sink = RecordingSink::new();
    app.handle_line("nop", &mut sink);
    app.handle_line("hello seth zzz nop", &mut sink);
    assert!(sink.events.contains(&AppEvent::CommandRejected(CommandError::MalformedInput)));
    assert!(
        sink.events
            .contains(&AppEvent::CommandRejected(CommandError::AuthenticationRequired))
    );
}

#[test]
fn numeric_command_and_register_ids() {
    let app = make_service();
    let out = app.handle_line("auth seth zzz 2 4 250", &mut RecordingSink::new());
    assert_eq!(out.reply, Ok(()));
    assert_eq!(app.register(Register::MaxVoltage.id()), 250);
}

#[test]
fn unknown_numeric_command_is_rejected_after_auth() {
    let app = make_service();
    assert_eq!(
        app.handle_line("auth seth zzz 7", &mut RecordingSink::new()).reply,
        Err(CommandError::UnknownCommand)
    );
    assert_eq!(
        app.handle_line("auth seth bad 7", &mut RecordingSink::new()).reply,
        Err(CommandError::BadPassword)
    );
}

#[test]
fn legacy_fallback_writes_register_zero() {
    let app = make_service();
    let out = app.handle_line("auth seth zzz set nonsense 123", &mut RecordingSink::new());
    assert_eq!(out.reply, Ok(()));
    assert_eq!(app.register(Register::Unused.id()), 123);
}

#[test]
fn anonymous_register_and_wrapped_value() {
    let app = make_service();
    app.handle_line("auth seth zzz set 200 300", &mut RecordingSink::new());
    assert_eq!(app.register(200), 44);
}

#[test]
fn every_handled_line_reports_visible_registers() {
    let app = make_service();
    let mut sink = RecordingSink::new();
    app.handle_line("auth seth zzz set 9 1", &mut sink);
    let Some(AppEvent::Registers(regs)) = sink.events.last() else {
        panic!("last event should be the register dump");
    };
    assert!(regs.contains(&(9, 1)));
    assert!(regs.contains(&(Register::Voltage.id(), 240)));
}

#[test]
fn strict_mode_rejects_unparsable_tokens() {
    let options = ServiceOptions {
        parse_mode: ParseMode::Strict,
        ..ServiceOptions::default()
    };
    let store = MemoryCredentialStore::parse(PASSWD);
    let app = AppService::with_bank(store, RegisterBank::new(), options);
    let mut sink = RecordingSink::new();

    let out = app.handle_line("auth seth zzz set voltage abc", &mut sink);
    assert_eq!(out.wire_text(), "Bad variable / value!");
    let out = app.handle_line("auth seth zzz set nonsense 123", &mut sink);
    assert_eq!(out.reply, Err(CommandError::BadVariable));
    let out = app.handle_line("auth seth zzz bogus", &mut sink);
    assert_eq!(out.wire_text(), "Bad or unknown command!");

    assert_eq!(app.snapshot(), RegisterBank::new());
    assert_eq!(sink.executed(), 0);

    // Well-formed numbers still work.
    assert_eq!(app.handle_line("auth seth zzz 2 3 230", &mut sink).reply, Ok(()));
    assert_eq!(app.register(Register::MinVoltage.id()), 230);
}
