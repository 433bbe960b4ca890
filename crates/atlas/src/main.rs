use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use atlas_core::kernel::bootstrap::{Host, HostMode};

/// Atlas: a standalone module orchestration host
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Data root the host keeps its module and config directories under
    #[arg(long, default_value = ".")]
    data_root: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inspect modules
    Module {
        #[command(subcommand)]
        command: ModuleCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ModuleCommand {
    /// Discover and list modules without enabling them
    List {},
}

fn main() -> ExitCode {
    env_logger::init();

    let args = CliArgs::parse();
    let mut host = Host::new(HostMode::Standalone, args.data_root);

    let store = host.default_store();
    if let Err(e) = host.init_discover(&store) {
        error!("Failed to initialize modules: {}", e);
        return ExitCode::FAILURE;
    }

    match args.command {
        Some(Commands::Module { command }) => match command {
            ModuleCommand::List {} => {
                let registry = host.manager().registry();
                if registry.is_empty() {
                    println!("No modules loaded.");
                } else {
                    println!("Loaded modules:");
                    for instance in registry.instances() {
                        let manifest = instance.manifest();
                        println!(
                            "  - Name: {}, Version: {}, Status: {:?}",
                            manifest.name,
                            manifest.version.as_deref().unwrap_or("<unversioned>"),
                            instance.status()
                        );
                    }
                }
                host.shutdown();
                ExitCode::SUCCESS
            }
        },
        None => {
            if let Err(e) = host.enable() {
                error!("Failed to enable modules: {}", e);
                host.shutdown();
                return ExitCode::FAILURE;
            }
            host.shutdown();
            ExitCode::SUCCESS
        }
    }
}
