//! Text-Line Broadcast Relay - Client Entry Point
//!
//! Connects to a relay server. Interactive mode pumps stdin lines to the
//! server (the literal line `EXIT` disconnects instead of being sent) and
//! prints server lines to stdout. With `-bot`, the command responder
//! drives replies off the server stream instead.

use std::env;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linecast::{BotAction, ClientConfig, Responder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("linecast=info")),
        )
        .init();

    let config = ClientConfig::from_args(env::args().skip(1));

    info!("connecting to {}:{}", config.host, config.port);
    let stream = TcpStream::connect((config.host.as_str(), config.port)).await?;
    info!("connected");

    if config.bot {
        run_bot(stream).await
    } else {
        run_interactive(stream).await
    }
}

/// Poll the server for lines, interpret each as a possible command, and
/// reply from the command table. The `!EXIT` command disconnects.
async fn run_bot(stream: TcpStream) -> Result<(), Box<dyn std::error::Error>> {
    let (read_half, mut write_half) = stream.into_split();
    let mut server_lines = BufReader::new(read_half).lines();
    let responder = Responder::new();

    while let Some(line) = server_lines.next_line().await? {
        println!("{line}");
        match responder.respond(&line) {
            Some(BotAction::Reply(reply)) => send_line(&mut write_half, &reply).await?,
            Some(BotAction::Farewell(farewell)) => {
                send_line(&mut write_half, &farewell).await?;
                break;
            }
            None => {}
        }
    }

    let _ = write_half.shutdown().await;
    info!("bot disconnected");
    Ok(())
}

/// Print server lines to stdout while pumping stdin lines to the server.
/// Ends when the user enters `EXIT`, stdin closes, or the server hangs up.
async fn run_interactive(stream: TcpStream) -> Result<(), Box<dyn std::error::Error>> {
    let (read_half, mut write_half) = stream.into_split();
    let mut server_lines = BufReader::new(read_half).lines();

    let mut printer = tokio::spawn(async move {
        while let Ok(Some(line)) = server_lines.next_line().await {
            println!("{line}");
        }
        info!("server closed the connection");
    });

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = &mut printer => break,
            line = stdin.next_line() => match line? {
                Some(line) if line.trim() == "EXIT" => break,
                Some(line) => send_line(&mut write_half, &line).await?,
                None => break,
            }
        }
    }

    let _ = write_half.shutdown().await;
    printer.abort();
    info!("client disconnected");
    Ok(())
}

async fn send_line(
    write_half: &mut OwnedWriteHalf,
    line: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    write_half.write_all(line.as_bytes()).await?;
    write_half.write_all(b"\n").await?;
    Ok(())
}
