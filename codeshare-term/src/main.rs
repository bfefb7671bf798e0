//! codeshare — terminal client for shared code rooms.
//!
//! Connects to a coordinating server over WebSocket, joins a room and
//! mirrors the shared buffer. Lines typed at the prompt are commands
//! (`:help`) or buffer edits. Ctrl-C sends a leave intent before exiting.

mod command;
mod view;

use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use codeshare_collab::{ClientConfig, CodeRoom, Delivery, JoinOutcome, Step, WsChannel};
use command::{Command, HELP};

/// Terminal client for shared code rooms
#[derive(Parser, Debug)]
#[command(name = "codeshare")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket URL of the coordinating server
    #[arg(long, env = "CODESHARE_SERVER_URL", default_value = "ws://localhost:5000")]
    server: String,

    /// Room to join on startup
    #[arg(long, requires = "name")]
    room: Option<String>,

    /// Display name used in the room
    #[arg(long, requires = "room")]
    name: Option<String>,

    /// How long typing and leave notices stay visible, in milliseconds
    #[arg(long, default_value_t = 2000)]
    signal_ttl_ms: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    // Everything runs on one thread; the room is never shared across tasks.
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("codeshare: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("codeshare: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = ClientConfig::default()
        .with_server_url(args.server)
        .with_signal_ttl(Duration::from_millis(args.signal_ttl_ms));

    info!("Connecting to {}", config.server_url);
    let channel = Arc::new(WsChannel::new(config.server_url.clone()));
    channel.connect().await?;

    let mut room = CodeRoom::new(channel.clone(), &config);
    room.start()?;
    let mut unload = room.install_unload_listener(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Ctrl-C handler unavailable: {e}");
            std::future::pending::<()>().await;
        }
    });

    println!("Connected to {}. Type :help for commands.", config.server_url);
    if let (Some(room_id), Some(name)) = (args.room, args.name) {
        apply(&mut room, Command::Join {
            room_id,
            user_name: name,
        });
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            () = unload.fired() => {
                room.handle_unload();
                println!("Left the room.");
                break;
            }
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !apply(&mut room, Command::parse(&line)) {
                        break;
                    }
                }
                None => {
                    room.leave();
                    break;
                }
            },
            step = room.step() => match step {
                Step::Event(applied) => {
                    if let Some(notice) = view::notice(&applied, &room.view()) {
                        println!("» {notice}");
                    }
                }
                Step::Expired(_) => {}
                Step::Closed => {
                    println!("Connection to server closed.");
                    break;
                }
            },
        }
    }

    channel.close().await;
    Ok(())
}

/// Run one prompt command. Returns `false` when the client should exit.
fn apply(room: &mut CodeRoom, command: Command) -> bool {
    match command {
        Command::Join { room_id, user_name } => match room.join(&room_id, &user_name) {
            JoinOutcome::Joined => println!("{}", view::render(&room.view())),
            JoinOutcome::MissingField => println!("Room id and name are both required."),
            JoinOutcome::AlreadyJoined => println!("Already in a room; :leave first."),
        },
        Command::Leave => {
            if room.leave() {
                println!("Left the room.");
            } else {
                println!("Not in a room.");
            }
        }
        Command::Language(language) => {
            report(room.on_local_language_change(language));
        }
        Command::Copy => match room.copy_room_id() {
            Some(room_id) => println!("Room id: {room_id}  (Copied!)"),
            None => println!("Not in a room."),
        },
        Command::Set(text) => report(room.on_local_content_change(text)),
        Command::Append(line) => {
            let current = &room.document().content;
            let content = if current.is_empty() {
                line
            } else {
                format!("{current}\n{line}")
            };
            report(room.on_local_content_change(content));
        }
        Command::Show => println!("{}", view::render(&room.view())),
        Command::Help => println!("{HELP}"),
        Command::Quit => {
            room.leave();
            return false;
        }
        Command::Invalid(reason) => println!("{reason}"),
    }
    true
}

fn report(delivery: Option<Delivery>) {
    match delivery {
        None => println!("Not in a room; :join first."),
        Some(Delivery::Dropped) => println!("(offline: change kept locally only)"),
        Some(Delivery::Sent) => {}
    }
}
