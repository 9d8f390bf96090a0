//! Session loop tests over an in-memory connection.

use std::io::ErrorKind;

use crate::mock::{MockConn, RecordingSink, make_service};

use breakerd::app::events::AppEvent;
use breakerd::session::{Session, SessionEnd, SessionState};
use breakerd::{CommandError, Register};

const MAX_LINE: usize = 8000;

#[test]
fn lines_split_across_reads_are_reassembled() {
    let app = make_service();
    let mut conn = MockConn::new(&[
        "auth se",
        "th zzz set volt",
        "age 241\nauth seth",
        " zzz nop\n",
    ]);
    let mut session = Session::new(1, &app, RecordingSink::new(), MAX_LINE);

    assert_eq!(session.run(&mut conn), SessionEnd::PeerClosed);
    assert_eq!(conn.replies(), ["OK", "OK"]);
    assert_eq!(session.lines_handled(), 2);
    assert_eq!(app.register(Register::Voltage.id()), 241);
}

#[test]
fn several_lines_in_one_read() {
    let app = make_service();
    let mut conn = MockConn::new(&["auth seth zzz nop\nauth bob pw set voltage 1\nnop\n"]);
    let end = Session::new(1, &app, RecordingSink::new(), MAX_LINE).run(&mut conn);

    assert_eq!(end, SessionEnd::PeerClosed);
    assert_eq!(
        conn.replies(),
        ["OK", "Authorization required!", "Bad or unknown command!"]
    );
}

#[test]
fn crlf_line_endings() {
    let app = make_service();
    let mut conn = MockConn::new(&["auth seth zzz nop\r\n"]);
    Session::new(1, &app, RecordingSink::new(), MAX_LINE).run(&mut conn);
    assert_eq!(conn.replies(), ["OK"]);
}

#[test]
fn exit_replies_then_ends_session() {
    let app = make_service();
    let mut conn = MockConn::new(&["auth bob pw exit\n", "auth seth zzz set voltage 1\n"]);
    let mut session = Session::new(7, &app, RecordingSink::new(), MAX_LINE);

    assert_eq!(session.run(&mut conn), SessionEnd::Exit);
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(conn.replies(), ["OK"]);
    assert_eq!(app.register(Register::Voltage.id()), 240, "lines after exit are never read");
}

#[test]
fn read_error_closes_session() {
    let app = make_service();
    let mut conn = MockConn::new(&["auth seth zzz nop\n"]);
    conn.trailing_error = Some(ErrorKind::ConnectionReset);

    let end = Session::new(1, &app, RecordingSink::new(), MAX_LINE).run(&mut conn);
    assert_eq!(end, SessionEnd::Io(ErrorKind::ConnectionReset));
    assert_eq!(conn.replies(), ["OK"]);
}

#[test]
fn idle_timeout_closes_session() {
    let app = make_service();
    let mut conn = MockConn::new(&[]);
    conn.trailing_error = Some(ErrorKind::WouldBlock);

    let end = Session::new(1, &app, RecordingSink::new(), MAX_LINE).run(&mut conn);
    assert_eq!(end, SessionEnd::TimedOut);
    assert!(conn.written.is_empty());
}

#[test]
fn over_long_line_is_rejected_and_session_continues() {
    let app = make_service();
    let long = format!("auth seth zzz set voltage {}\n", "1".repeat(64));
    let mut conn = MockConn::new(&[&long, "auth seth zzz nop\n"]);
    let mut sink = RecordingSink::new();

    let mut session = Session::new(1, &app, &mut sink, 32);
    assert_eq!(session.run(&mut conn), SessionEnd::PeerClosed);
    assert_eq!(conn.replies(), ["Bad or unknown command!", "OK"]);
    assert_eq!(app.register(Register::Voltage.id()), 240);
}

#[test]
fn session_reports_trips_through_its_sink() {
    let app = make_service();
    let mut conn = MockConn::new(&["auth seth zzz set voltage 250\n"]);
    let mut sink = RecordingSink::new();

    Session::new(1, &app, &mut sink, MAX_LINE).run(&mut conn);
    assert_eq!(sink.trips(), 1);
    assert!(matches!(sink.events.last(), Some(AppEvent::Registers(_))));
}

#[test]
fn over_long_line_still_reports_registers() {
    let app = make_service();
    let long = format!("auth seth zzz set voltage {}\n", "1".repeat(64));
    let mut conn = MockConn::new(&[&long]);
    let mut sink = RecordingSink::new();

    Session::new(1, &app, &mut sink, 32).run(&mut conn);
    assert_eq!(
        sink.events,
        [
            AppEvent::CommandRejected(CommandError::MalformedInput),
            AppEvent::Registers(app.snapshot().iter_visible().collect()),
        ]
    );
}
