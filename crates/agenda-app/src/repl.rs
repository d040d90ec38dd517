//! Interactive chat loop. The history lives here, on the client side;
//! every turn sends all of it to the orchestrator.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use agenda_ai::{DisplayKind, DisplayMessage, Message, Orchestrator, TokenTracker};
use agenda_common::{AgendaError, Caller};

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

pub async fn run(orchestrator: &Orchestrator, caller: Caller) -> Result<(), AgendaError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut history: Vec<Message> = Vec::new();
    let mut session = TokenTracker::new();

    println!(
        "Talking to your agenda as {}. Type /reset to start over, /quit to leave.",
        caller.display_name()
    );

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                history.clear();
                println!("{DIM}(conversation cleared){RESET}");
                continue;
            }
            _ => {}
        }

        let mut turn = history.clone();
        turn.push(Message::user(line));

        match orchestrator.run(turn, &caller).await {
            Ok(transcript) => {
                for message in &transcript.display {
                    print_display(message);
                }
                session.merge(&transcript.usage);
                debug!(
                    tokens = transcript.usage.total_tokens(),
                    session_tokens = session.total_tokens(),
                    "turn finished"
                );
                history = transcript.history;
            }
            Err(err) => {
                error!(error = %err, "conversation run failed");
                print_display(&DisplayMessage::error(
                    orchestrator.options().error_message.clone(),
                ));
            }
        }
    }

    for (provider, usage) in session.providers() {
        info!(
            provider,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "session token usage"
        );
    }

    Ok(())
}

fn print_display(message: &DisplayMessage) {
    match message.kind {
        DisplayKind::Reply => println!("{}", message.content),
        DisplayKind::ToolNotice | DisplayKind::Error => {
            println!("{DIM}{}{RESET}", message.content)
        }
    }
}
