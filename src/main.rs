use clap::Parser;
use sqlinear::{executor, logging, server};
use std::process::ExitCode;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::error;

/// In-memory SQL server speaking newline-delimited requests over TCP.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port to listen on, privileged ports are refused
    #[arg(short, long, default_value_t = 9094, value_parser = clap::value_parser!(u16).range(1024..))]
    port: u16,

    /// Read queries from stdin instead of listening
    #[arg(long)]
    repl: bool,

    /// More logging, repeat for more
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    let outcome = if args.repl {
        repl().await
    } else {
        match TcpListener::bind((args.host.as_str(), args.port)).await {
            Ok(listener) => server::serve(listener).await,
            Err(e) => {
                error!(host = %args.host, port = args.port, error = %e, "cannot start server");
                return ExitCode::from(102);
            }
        }
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "i/o failure");
            ExitCode::FAILURE
        }
    }
}

async fn repl() -> io::Result<()> {
    let mut exec = executor::Executor::new();
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();
    stdout
        .write_all(b"sqlinear REPL (type '.exit' or '.quit' to stop)\n")
        .await?;
    let mut buffer = String::new();
    loop {
        let prompt: &[u8] = if buffer.is_empty() { b"sql> " } else { b"...  " };
        stdout.write_all(prompt).await?;
        stdout.flush().await?;
        let Some(input) = lines.next_line().await? else {
            break;
        };
        // 종료 명령어 처리
        let trimmed = input.trim();
        if trimmed == ".exit" || trimmed == ".quit" {
            break;
        }
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(trimmed);
        if !trimmed.ends_with(';') {
            continue;
        }
        let src = std::mem::take(&mut buffer);
        if let Some(reply) = server::handle_line(&mut exec, &src) {
            server::write_reply(&mut stdout, &reply).await?;
        }
    }
    Ok(())
}
