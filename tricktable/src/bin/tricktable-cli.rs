mod cli;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};

use tricktable::deck::HttpDeckApi;
use tricktable::session::Session;
use tricktable_shared::ClientMsg;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let resend_after = Duration::from_millis(cli.resend_after_ms);

    match cli.command {
        Commands::Signup {
            first_name,
            last_name,
            username,
            password,
        } => {
            cli::signup(
                &cli.server,
                first_name,
                last_name,
                username,
                password,
                &cli.session,
            )
            .await?;
        }
        Commands::Login { username, password } => {
            cli::login(&cli.server, username, password, &cli.session).await?;
        }
        Commands::Create => {
            let mut session = Session::load(&cli.session)?;
            let token = session.require_token()?.to_string();
            let attached = cli::attach(&cli.server, ClientMsg::Create { token }).await?;
            session.channel_name = Some(attached.room_id.clone());
            session.save(&cli.session)?;
            println!("Created room '{}'. Share the id so others can join.", attached.room_id);
            cli::run_table(attached, None, resend_after).await?;
        }
        Commands::Join { room_id } => {
            let mut session = Session::load(&cli.session)?;
            let token = session.require_token()?.to_string();
            let username = session
                .username
                .clone()
                .context("session has no username; run 'signup' or 'login' first")?;
            cli::join_game(&cli.server, &username, &room_id).await?;
            let attached = cli::attach(
                &cli.server,
                ClientMsg::Join {
                    token,
                    room_id: room_id.clone(),
                },
            )
            .await?;
            session.channel_name = Some(room_id);
            session.save(&cli.session)?;
            cli::run_table(attached, None, resend_after).await?;
        }
        Commands::Start => {
            let session = Session::load(&cli.session)?;
            let token = session.require_token()?.to_string();
            let room_id = session
                .channel_name
                .clone()
                .context("session has no room; run 'create' or 'join' first")?;
            let attached = cli::attach(&cli.server, ClientMsg::Join { token, room_id }).await?;
            let deck_api = HttpDeckApi::new(cli.deck_api.clone());
            cli::deal_and_watch(attached, &deck_api, resend_after).await?;
        }
        Commands::Watch => {
            let session = Session::load(&cli.session)?;
            let token = session.require_token()?.to_string();
            let room_id = session
                .channel_name
                .clone()
                .context("session has no room; run 'create' or 'join' first")?;
            let attached = cli::attach(&cli.server, ClientMsg::Join { token, room_id }).await?;
            cli::run_table(attached, None, resend_after).await?;
        }
    }
    Ok(())
}
