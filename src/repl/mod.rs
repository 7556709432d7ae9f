use std::error::Error;

use log::error;
use tokio::io::{ AsyncBufReadExt, BufReader, Lines, Stdin };

use crate::auth::{ AuthService, SignupForm };
use crate::cli::Args;
use crate::models::chat::{ Message, Sender };
use crate::render::bubble::format_bubble;
use crate::render::table::RenderedTable;
use crate::render::{ classify, Shape };
use crate::session::ChatSession;

const HELP: &str = "\
commands:
  /new                start a new chat
  /chats              list your chats
  /open <id>          open a chat by id
  /search <query>     search chat titles
  /find [query]       filter and highlight messages in this chat (no query clears)
  /signup             create an account
  /login              log in against the backend
  /profile            show the stored profile
  /logout             log out and clear local data
  /clear-history      delete all chats
  /quit               exit
anything else is sent to the assistant.";

/// Line-based front end over the session and auth layers. All behavior
/// lives below it; this loop only parses commands and prints renderings.
pub async fn run(
    session: ChatSession,
    auth: AuthService,
    args: &Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if args.voice {
        println!("Welcome to the medical Assistant Bot.");
    }
    println!("Hii 👋  How can I help you ?");
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    // The in-chat search query; doubles as the highlight for bubbles.
    let mut find_query = String::new();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        match line.split_once(' ').map(|(cmd, rest)| (cmd, rest.trim())) {
            _ if line.is_empty() => {}
            _ if line == "/quit" => break,
            _ if line == "/help" => println!("{}", HELP),
            _ if line == "/new" => {
                session.start_new_chat().await;
                find_query.clear();
                println!("started a new chat");
            }
            _ if line == "/chats" => print_chat_list(&session.chat_list().await),
            _ if line == "/signup" => handle_signup(&auth, &mut lines).await,
            _ if line == "/login" => handle_login(&auth, &mut lines).await,
            _ if line == "/profile" => match auth.profile().await {
                Ok(profile) => {
                    println!("Username: {}", profile.name);
                    println!("Email: {}", profile.email);
                    println!("Status: {}", profile.status);
                }
                Err(err) => error!("could not read profile: {}", err),
            },
            _ if line == "/logout" => match auth.logout().await {
                Ok(()) => println!("Logged out - all data cleared!"),
                Err(err) => error!("logout failed: {}", err),
            },
            _ if line == "/clear-history" => {
                session.delete_history().await;
                println!("chat history deleted");
            }
            _ if line == "/find" => {
                find_query.clear();
                render_chat(&session, &find_query).await;
            }
            Some(("/open", rest)) => match rest.parse::<i64>() {
                Ok(id) => {
                    if session.open_chat(id).await {
                        find_query.clear();
                        render_chat(&session, &find_query).await;
                    } else {
                        println!("no chat with id {}", id);
                    }
                }
                Err(_) => println!("no chat with id {:?}", rest),
            },
            Some(("/search", rest)) => print_chat_list(&session.search_chats(rest).await),
            Some(("/find", rest)) => {
                find_query = rest.to_string();
                render_chat(&session, &find_query).await;
            }
            _ => {
                if let Some(handle) = session.send_message(&line).await {
                    // Wait for this reply so it can be printed in order;
                    // the send itself already happened fire-and-forget.
                    if let Err(err) = handle.await {
                        error!("reply task failed: {}", err);
                    }
                }
                render_chat(&session, &find_query).await;
            }
        }
    }

    Ok(())
}

async fn handle_signup(auth: &AuthService, lines: &mut Lines<BufReader<Stdin>>) {
    let Some(form) = read_signup_form(lines).await else {
        return;
    };
    match auth.sign_up(&form).await {
        Ok(()) => println!("account created for {}", form.username),
        Err(err) => println!("{}", err),
    }
}

async fn read_signup_form(lines: &mut Lines<BufReader<Stdin>>) -> Option<SignupForm> {
    Some(SignupForm {
        username: prompt(lines, "Username: ").await?,
        email: prompt(lines, "Email Address: ").await?,
        password: prompt(lines, "Password: ").await?,
        confirm_password: prompt(lines, "Confirm Password: ").await?,
    })
}

async fn handle_login(auth: &AuthService, lines: &mut Lines<BufReader<Stdin>>) {
    let Some(username) = prompt(lines, "Username: ").await else {
        return;
    };
    let Some(password) = prompt(lines, "Password: ").await else {
        return;
    };
    match auth.login(&username, &password).await {
        Ok(profile) => println!("logged in as {} ({})", profile.name, profile.status),
        Err(err) => println!("{}", err),
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Option<String> {
    use std::io::Write;
    print!("{}", label);
    let _ = std::io::stdout().flush();
    match lines.next_line().await {
        Ok(Some(line)) => Some(line.trim().to_string()),
        _ => None,
    }
}

fn print_chat_list(chats: &[(i64, String)]) {
    if chats.is_empty() {
        println!("no chats yet");
        return;
    }
    println!("Your Chats...");
    for (id, title) in chats {
        println!("  {}  {}", id, title);
    }
}

async fn render_chat(session: &ChatSession, highlight: &str) {
    let messages = session.visible_messages(highlight).await;
    if messages.is_empty() && session.active_chat().await.is_none() {
        println!("Hii 👋  How can I help you ?");
        return;
    }
    for message in &messages {
        print_message(message, highlight);
    }
}

fn print_message(message: &Message, highlight: &str) {
    match message.sender {
        Sender::User => {
            println!("[{}] you:", message.time);
            println!("{}", format_bubble(&message.text, highlight));
        }
        Sender::Bot => {
            println!("[{}] bot:", message.time);
            match classify(&message.text) {
                shape @ (Shape::MultiColumnTable { .. } | Shape::SingleColumnTable { .. }) => {
                    if let Some(table) = RenderedTable::from_shape(&shape) {
                        println!("{}", table.to_text());
                    }
                }
                Shape::DelimitedParagraph(text) | Shape::PlainBubble(text) => {
                    println!("{}", format_bubble(&text, highlight));
                }
            }
        }
    }
}
