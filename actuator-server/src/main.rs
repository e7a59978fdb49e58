use std::{
    io::{BufRead, BufReader, Write},
    net::{Shutdown, TcpListener, TcpStream},
    thread,
};

use actuator_shared::{to_hex, Frame, ProtocolVersion, DEFAULT_LISTEN_ADDR};
use clap::Parser;
use log::{debug, error, info, warn};

use http::{read_request, Request, RequestError, Response};

mod http;

/// Stand-in actuator: decodes posted frames and logs them.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_LISTEN_ADDR)]
    listen: String,

    /// Wire format the client sends: v1, v2 or v3
    #[arg(long, default_value_t = ProtocolVersion::V3)]
    protocol: ProtocolVersion,
}

fn respond(request: &Request, protocol: ProtocolVersion) -> Response {
    debug!(
        "{} {} {}",
        request.method,
        request.path,
        to_hex(&request.body)
    );

    if request.method != "POST" {
        return Response::text(405, "POST a frame");
    }

    match Frame::decode(&request.body, protocol) {
        Ok(frame) => {
            info!("{frame}");
            match serde_json::to_vec(&frame) {
                Ok(body) => Response::json(body),
                Err(e) => Response::text(500, e.to_string()),
            }
        }
        Err(e) => {
            warn!("Rejected frame: {e}");
            Response::text(400, e.to_string())
        }
    }
}

fn handle_client(
    reader: &mut impl BufRead,
    writer: &mut impl Write,
    protocol: ProtocolVersion,
) -> Result<(), RequestError> {
    loop {
        match read_request(reader) {
            Ok(Some(request)) => respond(&request, protocol).write_to(writer)?,
            Ok(None) => return Ok(()),
            Err(RequestError::TooLarge(len)) => {
                Response::text(413, format!("{len} bytes is not a frame")).write_to(writer)?;
                return Err(RequestError::TooLarge(len));
            }
            Err(RequestError::Malformed(what)) => {
                Response::text(400, what).write_to(writer)?;
                return Err(RequestError::Malformed(what));
            }
            Err(e) => return Err(e),
        }
    }
}

fn serve(stream: &TcpStream, protocol: ProtocolVersion) -> Result<(), RequestError> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    handle_client(&mut reader, &mut writer, protocol)
}

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let listener = TcpListener::bind(&args.listen)?;
    info!(
        "Actuator listening on {} for {} frames",
        args.listen, args.protocol
    );

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let peer = stream
                    .peer_addr()
                    .map(|addr| addr.to_string())
                    .unwrap_or_else(|_| "unknown peer".to_string());
                debug!("New connection: {peer}");

                let protocol = args.protocol;
                thread::spawn(move || {
                    if let Err(e) = serve(&stream, protocol) {
                        warn!("Closing connection with {peer}: {e}");
                        stream.shutdown(Shutdown::Both).ok();
                    }
                });
            }
            Err(e) => {
                error!("Error: {e}");
            }
        }
    }

    Ok(())
}
