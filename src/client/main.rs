use clap::{ErrorKind, Parser};
use log::LevelFilter;
use shared::{
    addr_to_string,
    codec::DEFAULT_MAX_FRAME,
    interpreter::{run_session, ClientEnd, Interpreter},
    logger, parse_port, BoxError,
};
use std::{
    io::{self, Write},
    net::{IpAddr, SocketAddr},
    process,
};
use tokio::{io::BufReader, net::TcpStream};

/// Sends text and source files to a textdrop server
///
/// Commands: `select file <name>`, `send file`, `exit`
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Server address, IPv4 or IPv6
    address: IpAddr,

    /// Server port
    #[clap(parse(try_from_str = parse_port))]
    port: u16,

    /// Largest message to send or accept in bytes, terminator included
    #[clap(long, default_value_t = DEFAULT_MAX_FRAME)]
    max_frame: usize,

    /// Show debug logs
    #[clap(short, long)]
    verbose: bool,
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

    logger::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    let addr = SocketAddr::new(args.address, args.port);
    let mut stream = TcpStream::connect(addr).await?;
    println!("Connected to {}", addr_to_string(&addr));

    let input = BufReader::new(tokio::io::stdin());
    let mut out = io::stdout();
    let end = run_session(&mut stream, input, &mut out, Interpreter::new(args.max_frame)).await?;
    out.flush()?;

    match end {
        ClientEnd::InputClosed => Ok(()),
        ClientEnd::Disconnected | ClientEnd::ConnectionClosed => process::exit(1),
    }
}
