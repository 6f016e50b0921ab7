use clap::{Parser, Subcommand};
use roster_cli::api::{self, CommandError};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster")]
#[command(version)]
#[command(about = "Manage students and their course enrollments", long_about = None)]
struct Cli {
    /// Path to the roster TOML config
    #[arg(short, long, default_value = "roster.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List student details (active only unless --all)
    #[clap(visible_alias = "ls")]
    Students {
        /// Include logically deleted students
        #[arg(short, long)]
        all: bool,
    },
    /// List students within an inclusive age range
    Ages {
        #[arg(long)]
        min: Option<u32>,
        #[arg(long)]
        max: Option<u32>,
    },
    /// Show one student with enrollments
    Show {
        /// Student id (UUID)
        id: String,
    },
    /// List enrollments, optionally for one course name
    Courses {
        /// Course name, matched ignoring case
        #[arg(short, long)]
        name: Option<String>,
    },
    /// List the course catalog
    Catalog,
    /// Register a student from a JSON payload file
    Register { payload: PathBuf },
    /// Update a student and its enrollments from a JSON payload file
    Update { payload: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CommandError> {
    let config = api::load_config(&cli.config)?;

    match cli.command {
        Commands::Students { all } => print_json(&api::list_students(&config, all)?),
        Commands::Ages { min, max } => {
            print_json(&api::list_students_by_age(&config, min, max)?)
        }
        Commands::Show { id } => print_json(&api::show_student(&config, &id)?),
        Commands::Courses { name } => {
            print_json(&api::list_enrollments(&config, name.as_deref())?)
        }
        Commands::Catalog => print_json(&api::list_catalog(&config)?),
        Commands::Register { payload } => {
            print_json(&api::register_from_file(&config, &payload)?)
        }
        Commands::Update { payload } => print_json(&api::update_from_file(&config, &payload)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
