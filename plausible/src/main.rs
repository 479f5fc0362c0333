use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use kube::Client;
use plausible_crds::v1beta1::{
    CustomProperty, Goal, Guest, ProviderConfig, ProviderConfigUsage, SharedLink, Site, Team,
};
use tokio::select;
use tracing::{info, Level};

use crate::{
    config::{Config, RunOptions},
    connection::ConnectionResolver,
    managed::{controller, Context},
    store::{ClusterStore, KubeStore},
};

mod client;
mod config;
mod connection;
mod custom_property;
mod error;
mod goal;
mod guest;
mod managed;
mod reference;
mod shared_link;
mod site;
mod store;
mod team;

#[cfg(test)]
mod fixtures;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    PrintCrds,
    DumpCrds {
        path: PathBuf,
    },
    Run {
        #[command(flatten)]
        options: RunOptions,

        /// Log at debug level.
        #[clap(long)]
        debug: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> error::Result<()> {
    let args = Args::parse();

    let debug = matches!(args.command, Command::Run { debug: true, .. });
    tracing_subscriber::fmt()
        .with_max_level(if debug { Level::DEBUG } else { Level::INFO })
        .init();

    match args.command {
        Command::PrintCrds => {
            println!("{}", plausible_crd_utils::serialize_crd::<Site>().unwrap());
            println!("{}", plausible_crd_utils::serialize_crd::<Goal>().unwrap());
            println!("{}", plausible_crd_utils::serialize_crd::<Guest>().unwrap());
            println!("{}", plausible_crd_utils::serialize_crd::<SharedLink>().unwrap());
            println!("{}", plausible_crd_utils::serialize_crd::<CustomProperty>().unwrap());
            println!("{}", plausible_crd_utils::serialize_crd::<Team>().unwrap());
            println!("{}", plausible_crd_utils::serialize_crd::<ProviderConfig>().unwrap());
            println!("{}", plausible_crd_utils::serialize_crd::<ProviderConfigUsage>().unwrap());
        }
        Command::DumpCrds { path } => {
            plausible_crd_utils::write_to_path::<Site>(&path).unwrap();
            plausible_crd_utils::write_to_path::<Goal>(&path).unwrap();
            plausible_crd_utils::write_to_path::<Guest>(&path).unwrap();
            plausible_crd_utils::write_to_path::<SharedLink>(&path).unwrap();
            plausible_crd_utils::write_to_path::<CustomProperty>(&path).unwrap();
            plausible_crd_utils::write_to_path::<Team>(&path).unwrap();
            plausible_crd_utils::write_to_path::<ProviderConfig>(&path).unwrap();
            plausible_crd_utils::write_to_path::<ProviderConfigUsage>(&path).unwrap();
        }
        Command::Run { options, .. } => {
            let config = Config::from(options);
            info!(?config, "starting controllers");

            let client = Client::try_default().await?;
            let store: Arc<dyn ClusterStore> = Arc::new(KubeStore::new(client.clone()));

            let ctx = Arc::new(Context {
                client,
                resolver: ConnectionResolver::new(store.clone(), &config),
                store,
                config,
            });

            select! {
                _ = controller::<Site>(ctx.clone()) => (),
                _ = controller::<Goal>(ctx.clone()) => (),
                _ = controller::<Guest>(ctx.clone()) => (),
                _ = controller::<SharedLink>(ctx.clone()) => (),
                _ = controller::<CustomProperty>(ctx.clone()) => (),
                _ = controller::<Team>(ctx.clone()) => (),
            }
        }
    }

    Ok(())
}
