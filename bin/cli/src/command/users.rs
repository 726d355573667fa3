use anyhow::Context;
use clap::{Args, Subcommand};
use colored::Colorize;
use spindb_adapter::CreateUserOpts;
use spindb_credentials::{PasswordOptions, default_username, generate_password};
use spindb_types::Engine;

use crate::command::Ctx;
use crate::output::emit;

#[derive(Debug, Args)]
pub struct UsersArgs {
  #[command(subcommand)]
  pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
  /// Create a database user and persist the credential.
  Create(UsersCreateArgs),
  /// List saved usernames for a container.
  List(UsersListArgs),
}

#[derive(Debug, Args)]
pub struct UsersCreateArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,

  /// Username; defaults to the engine's conventional default
  /// (`admin`, `api_key`, `search_key`).
  #[arg(long)]
  pub username: Option<String>,

  /// Password; a secure random one is generated if omitted.
  #[arg(long)]
  pub password: Option<String>,

  #[arg(long)]
  pub database: Option<String>,
}

#[derive(Debug, Args)]
pub struct UsersListArgs {
  pub name: String,

  #[arg(long, short = 'e')]
  pub engine: Engine,
}

pub async fn handle(ctx: &Ctx, args: &UsersArgs) -> anyhow::Result<()> {
  match &args.command {
    UsersCommand::Create(args) => create(ctx, args).await,
    UsersCommand::List(args) => list(ctx, args),
  }
}

async fn create(ctx: &Ctx, args: &UsersCreateArgs) -> anyhow::Result<()> {
  let config = ctx
    .manager
    .get_config(&args.name, args.engine)?
    .with_context(|| format!("container '{}' not found", args.name))?;
  let adapter = ctx.adapters.get_for_engine(args.engine)?;

  let username = args
    .username
    .clone()
    .unwrap_or_else(|| default_username(args.engine).to_string());
  let password = args
    .password
    .clone()
    .unwrap_or_else(|| generate_password(PasswordOptions::default()));

  let bundle = adapter
    .create_user(
      &config,
      &CreateUserOpts {
        username: username.clone(),
        password,
        database: args.database.clone(),
      },
    )
    .await?;
  ctx
    .credentials
    .save(&args.name, args.engine, &username, &bundle)?;

  emit(ctx.json, &username, |username| {
    println!(
      "{} created user '{username}' for '{}'",
      "ok:".green().bold(),
      args.name
    );
  });
  Ok(())
}

fn list(ctx: &Ctx, args: &UsersListArgs) -> anyhow::Result<()> {
  let usernames = ctx.credentials.list(&args.name, args.engine)?;
  emit(ctx.json, &usernames, |usernames| {
    if usernames.is_empty() {
      println!("no saved users");
      return;
    }
    for username in usernames {
      println!("{username}");
    }
  });
  Ok(())
}
