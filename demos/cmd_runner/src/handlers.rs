use std::cell::RefCell;
use std::rc::Rc;

use cmd_core::{ArgBundle, Value};

/// Text shared by the built-in `help` and `dump` commands, filled once
/// registration is complete.
pub type Listing = Rc<RefCell<String>>;

pub fn greet(args: &ArgBundle<'_>) {
    let name: &str = args.next_as().unwrap_or_default();
    println!("Hello, {}!", name);
}

pub fn led_on(args: &ArgBundle<'_>) {
    let index: u8 = args.next_as().unwrap_or_default();
    println!("led {} on", index);
}

pub fn led_off(args: &ArgBundle<'_>) {
    let index: u8 = args.next_as().unwrap_or_default();
    println!("led {} off", index);
}

pub fn led_blink(args: &ArgBundle<'_>) {
    let index: u8 = args.next_as().unwrap_or_default();
    let period_ms: u16 = args.next_as().unwrap_or_default();
    println!("led {} blinking every {} ms", index, period_ms);
}

pub fn config_set(args: &ArgBundle<'_>) {
    let key: &str = args.next_as().unwrap_or_default();
    let value: i32 = args.next_as().unwrap_or_default();
    println!("config: {} = {}", key, value);
}

pub fn config_get(args: &ArgBundle<'_>) {
    let key: &str = args.next_as().unwrap_or_default();
    println!("config: {} = <unset>", key);
}

pub fn peek(args: &ArgBundle<'_>) {
    let address: usize = args.next_as().unwrap_or_default();
    let len: u32 = args.next_as().unwrap_or_default();
    println!("peek {} bytes at {:#x}", len, address);
}

pub fn mix(args: &ArgBundle<'_>) {
    let tag: char = args.next_as().unwrap_or_default();
    let delta: i8 = args.next_as().unwrap_or_default();
    let total: u64 = args.next_as().unwrap_or_default();
    let offset: i64 = args.next_as().unwrap_or_default();
    println!("mix: tag={}, delta={}, total={}, offset={}", tag, delta, total, offset);
}

/// Print every value, whatever its type.
pub fn echo(args: &ArgBundle<'_>) {
    let values: Vec<String> = args.values().map(|v: Value<'_>| v.to_string()).collect();
    println!("{}", values.join(" "));
}

pub fn help(args: &ArgBundle<'_>) {
    if let Some(listing) = args.context::<Listing>() {
        println!("Commands: {}", listing.borrow());
    }
}

pub fn dump(args: &ArgBundle<'_>) {
    if let Some(listing) = args.context::<Listing>() {
        print!("{}", listing.borrow());
    }
}
