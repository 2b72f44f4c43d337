use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    let cli = culinary::cli::Cli::parse();
    culinary::logging::init(cli.log_format).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        culinary::cli::Command::Normalize(args) => {
            culinary::normalize::run(args).context("normalize")?;
        }
        culinary::cli::Command::SeedCatalog(args) => {
            let store = culinary::store::LocalFsStore::new(&args.data_dir);
            let added = culinary::catalog::seed_catalog(&store)
                .await
                .context("seed catalog")?;
            println!("added {added} catalog entries to {}", args.data_dir.display());
        }
    }

    Ok(())
}
