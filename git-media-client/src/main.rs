use std::path::PathBuf;

use anyhow::{Context, Result};
use structopt::StructOpt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use git_media_client::{Client, Config, Endpoint, GitCredentialHelper, LogObserver};

#[derive(StructOpt, Debug)]
#[structopt(about = "Store large git objects on a git-media server")]
struct Opt {
    /// Base URL of the git-media server
    #[structopt(long, env = "GIT_MEDIA_ENDPOINT")]
    endpoint: Endpoint,
    /// git executable used to look up credentials
    #[structopt(long, default_value = "git", parse(from_os_str))]
    git: PathBuf,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Ask the server about a local object without sending it
    Probe {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
    /// Send a local object to the server
    Upload {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
        /// Name to report instead of the object path
        #[structopt(long)]
        name: Option<String>,
    },
    /// Write an object to stdout, fetching it if there is no local copy
    Download {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,
    },
}

async fn copy_to(mut reader: impl AsyncRead + Unpin, mut writer: impl AsyncWrite + Unpin) -> Result<()> {
    tokio::io::copy(&mut reader, &mut writer).await?;
    writer.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let client = Client::new(Config::new(opt.endpoint), GitCredentialHelper::new(opt.git));

    match opt.command {
        Command::Probe { path } => client
            .probe(&path)
            .await
            .with_context(|| format!("could not probe {}", path.display()))?,
        Command::Upload { path, name } => {
            let metadata = tokio::fs::metadata(&path)
                .await
                .with_context(|| format!("could not read {}", path.display()))?;
            let label = name.clone().unwrap_or_else(|| path.display().to_string());
            client
                .upload(&path, name.as_deref(), LogObserver::new(label, metadata.len()))
                .await
                .with_context(|| format!("could not upload {}", path.display()))?
        }
        Command::Download { path, output } => {
            let reader = client
                .download(&path)
                .await
                .with_context(|| format!("could not download {}", path.display()))?;
            match output {
                Some(output) => {
                    let file = tokio::fs::File::create(&output)
                        .await
                        .with_context(|| format!("could not create {}", output.display()))?;
                    copy_to(reader, file).await?
                }
                None => copy_to(reader, tokio::io::stdout()).await?,
            }
        }
    }
    Ok(())
}
