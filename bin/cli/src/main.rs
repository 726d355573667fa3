use clap::{Parser, Subcommand};
use spindb_config::CliArgs;
use spindb_paths::Layout;

mod command;
mod output;

use command::Ctx;

#[derive(Debug, Parser)]
#[command(name = "spindb", version, about = "Local database container manager")]
struct Cli {
  #[command(flatten)]
  global: CliArgs,

  #[command(subcommand)]
  command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Create a container record and provision its data directory.
  Create(command::create::CreateArgs),
  /// List containers, with live-probed status.
  List(command::list::ListArgs),
  /// Show a single container's configuration and live status.
  Info(command::info::InfoArgs),
  /// Start a container's engine process.
  Start(command::start::StartArgs),
  /// Stop a container's engine process.
  Stop(command::stop::StopArgs),
  /// Delete a container's record and directory tree.
  #[command(alias = "rm")]
  Delete(command::delete::DeleteArgs),
  /// Rename a stopped container.
  Rename(command::rename::RenameArgs),
  /// Run a SQL/script file or inline text against a container.
  Run(command::run::RunArgs),
  /// Run a single query and print its result.
  Query(command::query::QueryArgs),
  /// Back up a container to a file.
  Backup(command::backup::BackupArgs),
  /// Restore a container from a backup file.
  Restore(command::restore::RestoreArgs),
  /// Clone a container's data into a new one.
  Clone(command::clone::CloneArgs),
  /// Manage per-container credentials.
  Users(command::users::UsersArgs),
  /// Inspect the engine registry.
  Engines(command::engines::EnginesArgs),
}

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();
  let cli = Cli::parse();
  let config = spindb_config::init(&cli.global);
  if let Err(e) = spindb_logger::init(&config.log) {
    eprintln!("error: failed to init logger: {e}");
  }

  let layout = match &config.root_dir {
    Some(root) => Layout::with_root(root.clone()),
    None => Layout::default(),
  };
  let ctx = Ctx::new(layout, config.json_output);

  if let Err(e) = run(&ctx, &cli.command).await {
    output::emit_error(ctx.json, &e.to_string());
    std::process::exit(1);
  }
}

async fn run(ctx: &Ctx, command: &Command) -> anyhow::Result<()> {
  match command {
    Command::Create(args) => command::create::handle(ctx, args).await,
    Command::List(args) => command::list::handle(ctx, args).await,
    Command::Info(args) => command::info::handle(ctx, args).await,
    Command::Start(args) => command::start::handle(ctx, args).await,
    Command::Stop(args) => command::stop::handle(ctx, args).await,
    Command::Delete(args) => command::delete::handle(ctx, args).await,
    Command::Rename(args) => command::rename::handle(ctx, args).await,
    Command::Run(args) => command::run::handle(ctx, args).await,
    Command::Query(args) => command::query::handle(ctx, args).await,
    Command::Backup(args) => command::backup::handle(ctx, args).await,
    Command::Restore(args) => command::restore::handle(ctx, args).await,
    Command::Clone(args) => command::clone::handle(ctx, args).await,
    Command::Users(args) => command::users::handle(ctx, args).await,
    Command::Engines(args) => command::engines::handle(ctx, args),
  }
}
