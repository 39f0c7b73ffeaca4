use clap::{ErrorKind, Parser};
use log::{info, warn, LevelFilter};
use shared::{
    addr_to_string,
    codec::DEFAULT_MAX_FRAME,
    exchange::{ExitPolicy, Server, ServerConfig},
    logger, parse_port, BoxError,
};
use std::{
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    path::PathBuf,
    process,
    str::FromStr,
};

#[derive(Debug, Clone, Copy)]
enum IpVersion {
    V4,
    V6,
}

impl FromStr for IpVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v4" => Ok(IpVersion::V4),
            "v6" => Ok(IpVersion::V6),
            _ => Err(format!("expected v4 or v6, got {:?}", s)),
        }
    }
}

/// Receives text and source files and stores them in one directory
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Address family to listen on: v4 or v6
    ip_version: IpVersion,

    /// Port to listen on
    #[clap(parse(try_from_str = parse_port))]
    port: u16,

    /// Directory received files are written to
    #[clap(short, long, parse(from_os_str), default_value = ".")]
    dir: PathBuf,

    /// Largest accepted message in bytes, terminator included
    #[clap(long, default_value_t = DEFAULT_MAX_FRAME)]
    max_frame: usize,

    /// Let a client's exit close only its own connection
    #[clap(long)]
    keep_alive: bool,

    /// Log every request
    #[clap(short, long)]
    verbose: bool,
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            e.print()?;
            process::exit(1);
        }
    };

    // Init logger
    logger::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });

    let addr = match args.ip_version {
        IpVersion::V4 => SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port)),
        IpVersion::V6 => SocketAddr::from((Ipv6Addr::UNSPECIFIED, args.port)),
    };
    let config = ServerConfig {
        dir: args.dir,
        max_frame: args.max_frame,
        exit_policy: if args.keep_alive {
            ExitPolicy::CloseConnection
        } else {
            ExitPolicy::StopServer
        },
    };

    let server = Server::bind(addr, config).await?;
    info!(
        "bound to {}, waiting connections",
        addr_to_string(&server.local_addr()?)
    );

    server.run_until(ctrl_c()).await
}
