use std::process::ExitCode;

use argh::FromArgs;
use lightningfmt::conf::Config;
use log::{debug, info, warn};

#[derive(FromArgs, Clone)]
#[argh(help_triggers("-h", "--help"))]
/// Lightning CSS formatter language server
struct Cli {
    /// specify config file (by default lightningfmt tries to find it)
    #[argh(option, short = 'c')]
    cfg: Option<String>,
    /// write default configuration
    #[argh(switch)]
    write_default: bool,
    /// use default configuration
    #[argh(switch, short = 'd')]
    default_cfg: bool,
    /// communicate over stdin/stdout (the only transport, accepted for client compatibility)
    #[argh(switch)]
    stdio: bool,
}

fn main() -> ExitCode {
    let cmd: Cli = argh::from_env();
    match handle(cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn handle(cmd: Cli) -> Result<(), String> {
    if cmd.write_default {
        let path = Config::write_default()?;
        eprintln!("Wrote {}", path.display());
        return Ok(());
    }

    // Get config, a server without a config file still starts
    let (cfg, found) = if let Some(path) = &cmd.cfg {
        (
            Config::open(path).map_err(|e| format!("Failed to open config: {e}"))?,
            None,
        )
    } else if cmd.default_cfg {
        (Config::default(), None)
    } else {
        match Config::find() {
            Ok((conf, path)) => (conf, Some(Ok(path))),
            Err(e) => (Config::default(), Some(Err(e))),
        }
    };

    // stdout belongs to the protocol
    env_logger::Builder::new()
        .parse_filters(&cfg.server.log_level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
    match found {
        Some(Ok(path)) => info!("using configuration from {}", path.display()),
        Some(Err(e)) => warn!("{e}, using default configuration"),
        None => {}
    }
    if !cmd.stdio {
        debug!("no transport requested, serving over stdio");
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?
        .block_on(lightningfmt::server::serve(cfg));
    Ok(())
}
