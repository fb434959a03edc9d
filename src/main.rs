use clap::Parser;
use jira_timesheet::Cli;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .format_timestamp_millis()
    .try_init();

    let cli = Cli::parse();
    if let Err(err) = jira_timesheet::run(cli.command).await {
        log::error!("{}", err.describe());
        std::process::exit(1);
    }
}
