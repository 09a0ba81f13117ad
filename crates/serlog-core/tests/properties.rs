mod common;

use common::{MockLink, ScriptedOperator};
use proptest::prelude::*;
use serlog_core::session::handshake::{Handshake, HandshakeState, MAX_ATTEMPTS, SIGNAL_BYTE};
use serlog_core::session::{
    classify, HandshakePolicy, LineSink, Record, SessionConfig, SessionEngine,
};

#[derive(Debug, Clone)]
enum Input {
    Data(String),
    Echo(String),
    Blank,
    Timeout,
}

fn data_line() -> impl Strategy<Value = String> {
    "[ -~]{1,24}".prop_filter("not a tag or terminator", |s| {
        !s.starts_with("ECHO:") && s != "DONE"
    })
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        4 => data_line().prop_map(Input::Data),
        2 => "[ -~]{0,24}".prop_map(Input::Echo),
        1 => Just(Input::Blank),
        1 => Just(Input::Timeout),
    ]
}

proptest! {
    #[test]
    fn data_lines_persist_in_order(inputs in prop::collection::vec(input(), 0..40)) {
        let mut link = MockLink::new();
        let mut expected = String::new();
        let mut expected_echo = Vec::new();
        for item in &inputs {
            link = match item {
                Input::Data(s) => {
                    expected.push_str(s);
                    expected.push('\n');
                    link.with_lines(&[s.as_str()])
                }
                Input::Echo(s) => {
                    expected_echo.push(s.trim_start().to_string());
                    link.with_lines(&[format!("ECHO:{}", s).as_str()])
                }
                Input::Blank => link.with_lines(&[""]),
                Input::Timeout => link.with_timeout(),
            };
        }
        link = link.with_lines(&["DONE", "after"]);

        let mut config = SessionConfig::new("COM1", "out.csv");
        config.handshake = false;
        let mut operator = ScriptedOperator::new();
        let mut out = Vec::new();
        let result = SessionEngine::new(config, &mut link, &mut operator)
            .unwrap()
            .run_with_sink(|_| Ok(LineSink::new(&mut out)));

        prop_assert!(result.is_ok());
        prop_assert_eq!(String::from_utf8(out).unwrap(), expected);
        prop_assert_eq!(operator.statuses, expected_echo);
        prop_assert_eq!(link.lines.len(), 1);
    }

    #[test]
    fn classification_is_pure(text in "[ -~]{0,32}") {
        let first = classify(&text);
        prop_assert_eq!(first, classify(&text));
        match first {
            Record::Echo(payload) => {
                prop_assert!(text.starts_with("ECHO:"));
                prop_assert!(!payload.starts_with(char::is_whitespace));
            }
            Record::Terminator => prop_assert_eq!(text.as_str(), "DONE"),
            Record::Blank => prop_assert!(text.is_empty()),
            Record::Data(payload) => prop_assert_eq!(payload, text.as_str()),
        }
    }

    #[test]
    fn handshake_succeeds_iff_signal_before_third_timeout(
        reads in prop::collection::vec(prop::option::of(any::<u8>()), 0..20)
    ) {
        let mut hs = Handshake::new(HandshakePolicy::TimeoutsOnly);
        hs.start();
        for &read in &reads {
            if hs.observe(read).is_terminal() {
                break;
            }
        }

        let mut timeouts = 0;
        let mut expected = HandshakeState::AwaitingSignal { attempts: 0 };
        for &read in &reads {
            match read {
                Some(SIGNAL_BYTE) => {
                    expected = HandshakeState::Completed;
                    break;
                }
                Some(_) => {}
                None => {
                    timeouts += 1;
                    if timeouts == MAX_ATTEMPTS {
                        expected = HandshakeState::Failed;
                        break;
                    }
                    expected = HandshakeState::AwaitingSignal { attempts: timeouts };
                }
            }
        }
        prop_assert_eq!(hs.state(), expected);
    }
}
