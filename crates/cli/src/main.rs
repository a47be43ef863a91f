//! Demo application exercising the cmdkit command tree: nested
//! subcommands, aliases, typed flags with env/default fallbacks, and the
//! built-in help and completion commands.

use anyhow::Result;
use cmdkit::{AppBuilder, Command, Flag, FlagType};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    init_tracing();

    let app = build_app()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    app.run(&args)?;
    Ok(())
}

fn build_app() -> Result<cmdkit::App> {
    let app = AppBuilder::new("cmdkit-demo")
        .description("A demo of the cmdkit command framework.")
        .global_flag(
            Flag::new("config", FlagType::String)
                .short('c')
                .env("CMDKIT_CONFIG")
                .help("Path to the config file"),
        )
        .global_flag(
            Flag::new("verbose", FlagType::Count)
                .short('v')
                .help("Increase log verbosity (repeatable)"),
        )
        .command(
            Command::new("greet")
                .about("Print a greeting.")
                .alias("g")
                .usage("greet [flags] [name]")
                .example("greet --shout alice\ngreet -n bob --tag friend,colleague")
                .flag(
                    Flag::new("name", FlagType::String)
                        .short('n')
                        .default_value("world")
                        .help("Who to greet"),
                )
                .flag(Flag::new("shout", FlagType::Bool).help("Greet in uppercase"))
                .flag(
                    Flag::new("tag", FlagType::StringSlice)
                        .short('t')
                        .help("Labels to attach (repeatable or comma-separated)"),
                )
                .args_max(1)
                .execute(|ctx| {
                    let name = ctx
                        .args()
                        .first()
                        .map(String::as_str)
                        .or_else(|| ctx.string("name"))
                        .unwrap_or("world");
                    let mut greeting = format!("hello, {name}");
                    if ctx.bool("shout").unwrap_or(false) {
                        greeting = greeting.to_uppercase();
                    }
                    writeln!(ctx.output(), "{greeting}")?;
                    if let Some(tags) = ctx.string_slice("tag").map(|tags| tags.join(", ")) {
                        writeln!(ctx.output(), "tags: {tags}")?;
                    }
                    Ok(())
                }),
        )
        .command(
            Command::new("server")
                .about("Manage the demo server.")
                .alias("srv")
                .subcommand(
                    Command::new("start")
                        .about("Start the server.")
                        .alias("s")
                        .flag(
                            Flag::new("port", FlagType::Int)
                                .short('p')
                                .env("CMDKIT_PORT")
                                .default_value("8080")
                                .help("Port to listen on"),
                        )
                        .flag(
                            Flag::new("host", FlagType::String)
                                .default_value("127.0.0.1")
                                .help("Bind address"),
                        )
                        .execute(|ctx| {
                            let host = ctx.string("host").unwrap_or("127.0.0.1").to_string();
                            let port = ctx.int("port").unwrap_or(8080);
                            tracing::info!(%host, port, "starting server");
                            writeln!(ctx.output(), "listening on {host}:{port}")?;
                            Ok(())
                        }),
                )
                .subcommand(
                    Command::new("stop").about("Stop the server.").execute(|ctx| {
                        writeln!(ctx.output(), "stopped")?;
                        Ok(())
                    }),
                ),
        )
        .command(
            Command::new("db").about("Database maintenance.").subcommand(
                Command::new("migrate")
                    .about("Run schema migrations.")
                    .alias("m")
                    .subcommand(
                        Command::new("up")
                            .about("Apply pending migrations.")
                            .flag(
                                Flag::new("steps", FlagType::Int)
                                    .help("How many migrations to apply"),
                            )
                            .execute(|ctx| {
                                match ctx.int("steps") {
                                    Some(n) => writeln!(ctx.output(), "applying {n} migration(s)")?,
                                    None => writeln!(ctx.output(), "applying all migrations")?,
                                }
                                Ok(())
                            }),
                    )
                    .subcommand(
                        Command::new("down")
                            .about("Roll back the last migration.")
                            .execute(|ctx| {
                                writeln!(ctx.output(), "rolling back one migration")?;
                                Ok(())
                            }),
                    ),
            ),
        )
        .build()?;
    Ok(app)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_builds_cleanly() {
        let app = build_app().unwrap();
        assert_eq!(app.name(), "cmdkit-demo");
        assert!(app.commands().iter().any(|c| c.name() == "completion"));
    }

    #[test]
    fn demo_commands_run() {
        let app = build_app().unwrap();
        let mut buf = Vec::new();
        let args: Vec<String> = ["greet", "--shout", "-n", "rust"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        app.run_with_output(&args, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "HELLO, RUST\n");
    }
}
