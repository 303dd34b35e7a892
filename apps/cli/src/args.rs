use std::env;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub once: bool,
    pub help: bool,
}

pub fn parse_args() -> Result<CliArgs, String> {
    parse_from(env::args().skip(1))
}

pub fn parse_from<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--port" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --port".to_string())?;
                let port = value
                    .parse::<u16>()
                    .map_err(|_| format!("invalid port value: {value}"))?;
                parsed.port = Some(port);
            }
            "--once" => {
                parsed.once = true;
            }
            "--help" | "-h" => {
                parsed.help = true;
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "TokenBoard\n\n\
Usage:\n  tokenboard [--port <port>] [--once]\n\n\
Options:\n  --port <port>  Override the configured port for this run only\n  --once         Import all logs once, print the stats and exit\n  -h, --help     Show this help message\n"
    );
}
