mod handlers;

use std::io::{self, BufRead, Write};
use std::rc::Rc;

use heapless::String;
use log::{error, info};

use cmd_config::{INPUT_MAX_LEN, PROMPT};
use cmd_core::{DefaultShell, RegisterError, Registry};
use cmd_macros::register_commands;

use handlers::Listing;

register_commands! {
    mod commands;
    "greet <STRING>"                     => handlers::greet,
    "led <UBYTE> on"                     => handlers::led_on,
    "led <UBYTE> off"                    => handlers::led_off,
    "led <UBYTE> blink <USHORT>"         => handlers::led_blink,
    "config set <STRING> <INT>"          => handlers::config_set,
    "config get <STRING>"                => handlers::config_get,
    "peek <PTR> <UINT>"                  => handlers::peek,
    "mix <CHAR> <BYTE> <ULLONG> <LLONG>" => handlers::mix,
    "echo <SHORT> <LONG> <ULONG>"        => handlers::echo,
}

pub struct Runner {
    shell: DefaultShell,
}

impl Runner {
    pub fn new() -> Result<Self, RegisterError> {
        let mut registry = Registry::new();
        commands::register(&mut registry)?;

        // built-ins, filled once the tree is complete
        let names = Listing::default();
        let tree = Listing::default();
        registry.register_with_context("help", handlers::help, Rc::clone(&names))?;
        registry.register_with_context("dump", handlers::dump, Rc::clone(&tree))?;
        names.borrow_mut().push_str(&registry.command_names().join(" | "));
        tree.borrow_mut().push_str(&registry.dump());

        info!("{} root commands registered", registry.len());
        Ok(Self {
            shell: DefaultShell::with_registry(registry),
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("{}", PROMPT);
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            match line.trim() {
                "exit" | "quit" => break,
                "" => continue,
                _ => self.exec(&line),
            }
        }
        println!("⛔ Shell exited...");
        Ok(())
    }

    fn exec(&self, line: &str) {
        let mut input = String::<INPUT_MAX_LEN>::new();
        if input.push_str(line).is_err() {
            println!("❌ Error: line longer than {} bytes", INPUT_MAX_LEN);
            return;
        }

        match self.shell.try_execute(&input) {
            Ok(()) => println!("✅ Success: {}", input),
            Err(e) => println!("❌ Error: {} for line '{}'", e, input),
        }
    }
}

fn main() {
    env_logger::init();

    let mut runner = match Runner::new() {
        Ok(runner) => runner,
        Err(e) => {
            error!("command registration failed: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = runner.run() {
        error!("input error: {}", e);
    }
}

// ==================== TESTS =======================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_registers_every_command() {
        let runner = Runner::new().unwrap();
        let registry = runner.shell.registry();
        assert_eq!(
            registry.command_names(),
            vec!["config", "dump", "echo", "greet", "help", "led", "mix", "peek"]
        );
        assert_eq!(commands::SPECS.len(), 9);
        assert!(registry.lookup("led blink").is_some());
    }

    #[test]
    fn test_runner_executes_lines() {
        let runner = Runner::new().unwrap();
        assert!(runner.shell.execute("led 2 blink 500"));
        assert!(runner.shell.execute("peek 0x2000 16"));
        assert!(runner.shell.execute("mix x -1 18446744073709551615 -9"));
        assert!(runner.shell.execute("help"));
        assert!(!runner.shell.execute("led 2 blink"));
        assert!(!runner.shell.execute("help me"));
    }
}
