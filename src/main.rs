use mcstatus::{Conf, McsErr, ServerStatus};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
mcstatus - Minecraft server status checker

USAGE:
  mcstatus [OPTIONS] <host[:port]>...

OPTIONS:
  -h, --help            Prints help information
  -v, --verbose         Show resolver and protocol events
  --serialize           Print each status as JSON
  --saveicon            Save the first server icon found to icon.png
";

struct AppArgs {
    verbose: bool,
    serialize: bool,
    save_icon: bool,
    targets: Vec<String>,
}

fn parse_args() -> Result<AppArgs, pico_args::Error> {
    let mut pargs = pico_args::Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    Ok(AppArgs {
        verbose: pargs.contains(["-v", "--verbose"]),
        serialize: pargs.contains("--serialize"),
        save_icon: pargs.contains("--saveicon"),
        targets: pargs
            .finish()
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect(),
    })
}

fn init_logging(verbose: bool) {
    let filter = match verbose {
        true => EnvFilter::new("mcstatus=debug"),
        false => EnvFilter::from_default_env(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn status_line(target: &str, status: &ServerStatus, ping: Duration) -> String {
    format!(
        "{:<30} {:<4} / {:<5} ({:<5} {:<5} {}) \"{}\"",
        target,
        status.online_players,
        status.max_slots,
        format!("{}ms", ping.as_millis()),
        format!("{:?}", status.game_version),
        if status.is_modern { "new" } else { "old" },
        status.display_description()
    )
}

/// `<target>: error <stage>: <cause>`, the target named once.
fn error_line(target: &str, stage: &str, err: &McsErr) -> String {
    match err {
        McsErr::ResolveErr { source, .. } => {
            format!("{}: error {}: {}", target, stage, source)
        }
        err => format!("{}: error {}: {}", target, stage, err),
    }
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {}.", err);
            std::process::exit(2);
        }
    };
    let mut save_icon = args.save_icon;

    init_logging(args.verbose);

    for target in &args.targets {
        let conf = Conf::create(target);
        let addr = match conf.resolve() {
            Ok(addr) => addr,
            Err(err) => {
                println!("{}", error_line(target, "resolving", &err));
                continue;
            }
        };
        let (status, ping) = match mcstatus::check_status(&addr, &conf.socket_conf) {
            Ok(result) => result,
            Err(err) => {
                println!("{}", error_line(target, "checking", &err));
                continue;
            }
        };

        if args.serialize {
            match status.serialize_modern() {
                Ok(json) => println!("{}", String::from_utf8_lossy(&json)),
                Err(err) => println!("{}", error_line(target, "serializing", &err)),
            }
        } else {
            println!("{}", status_line(target, &status, ping));
        }

        if let Some(favicon) = status.favicon.as_ref().filter(|_| save_icon) {
            match std::fs::write("icon.png", favicon) {
                Ok(()) => save_icon = false,
                Err(err) => eprintln!("Error writing icon.png: {}", err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn error_lines_are_parallel() {
        let resolve = McsErr::ResolveErr {
            target: "nowhere.invalid".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such host"),
        };
        let check = McsErr::IoErr(io::Error::new(io::ErrorKind::TimedOut, "timed out"));

        assert_eq!(
            error_line("nowhere.invalid", "resolving", &resolve),
            "nowhere.invalid: error resolving: no such host"
        );
        assert_eq!(
            error_line("127.0.0.1", "checking", &check),
            "127.0.0.1: error checking: timed out"
        );
    }
}
