use std::cell::RefCell;

use cmd_core::{ArgBundle, DefaultShell, Registry};
use cmd_macros::register_commands;

thread_local! {
    static CALLS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn record(entry: String) {
    CALLS.with(|c| c.borrow_mut().push(entry));
}

fn take_calls() -> Vec<String> {
    CALLS.with(|c| c.borrow_mut().drain(..).collect())
}

mod handlers {
    use super::*;

    pub fn ping(_: &ArgBundle<'_>) {
        record("ping".into());
    }

    pub fn config_set(args: &ArgBundle<'_>) {
        let key: &str = args.next_as().unwrap_or_default();
        let value: i32 = args.next_as().unwrap_or_default();
        record(format!("set {key}={value}"));
    }

    pub fn config_get(args: &ArgBundle<'_>) {
        let key: &str = args.next_as().unwrap_or_default();
        record(format!("get {key}"));
    }
}

register_commands! {
    mod commands;
    "ping" => handlers::ping,
    "config set <STRING> <INT>" => handlers::config_set,
    "config   get <STRING>" => handlers::config_get,
}

#[test]
fn test_generated_specs_and_names() {
    assert_eq!(
        commands::SPECS,
        &["ping", "config set <STRING> <INT>", "config get <STRING>"]
    );
    assert_eq!(commands::get_command_names(), vec!["config", "ping"]);
}

#[test]
fn test_generated_registration_dispatches() {
    let mut shell = DefaultShell::new();
    commands::register(shell.registry_mut()).unwrap();

    assert!(shell.execute("ping"));
    assert!(shell.execute("config set speed -3"));
    assert!(shell.execute("config get speed"));
    assert!(!shell.execute("config set speed fast"));
    assert_eq!(take_calls(), vec!["ping", "set speed=-3", "get speed"]);
}

#[test]
fn test_registering_twice_reports_duplicate() {
    let mut registry = Registry::new();
    commands::register(&mut registry).unwrap();
    assert!(commands::register(&mut registry).is_err());
    assert_eq!(registry.len(), 2);
}
