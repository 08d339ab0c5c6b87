mod session;

use std::env;
use std::io::{self, BufRead, Write};
use std::process;

use monitor_core::boot::InitError;
use session::{Session, SessionOptions, SimProfile};

fn main() -> io::Result<()> {
    let options = parse_options().unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("Usage: monitor-emulator [--profile <wide|narrow>] [--store <path>]");
        process::exit(2);
    });

    let mut session = Session::new(&options).unwrap_or_else(|err| {
        // Fatal by policy: nothing runs on top of an unusable store.
        eprintln!("{}: {err}", InitError::StoreUnavailable);
        process::exit(1);
    });

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut line = String::new();

    writeln!(
        writer,
        "Energy node emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed) {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options() -> Result<SessionOptions, String> {
    let mut options = SessionOptions::default();
    let mut args = env::args().skip(1);

    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--profile=") {
            options.profile = SimProfile::from_tag(value)?;
        } else if arg == "--profile" {
            let value = args
                .next()
                .ok_or_else(|| "Expected value after --profile".to_string())?;
            options.profile = SimProfile::from_tag(&value)?;
        } else if let Some(value) = arg.strip_prefix("--store=") {
            options.store_path = Some(value.into());
        } else if arg == "--store" {
            let value = args
                .next()
                .ok_or_else(|| "Expected value after --store".to_string())?;
            options.store_path = Some(value.into());
        } else {
            return Err(format!("Unknown argument `{arg}`"));
        }
    }

    Ok(options)
}
