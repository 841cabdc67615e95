use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;

use scholaris_cli::admin::{NewSuperAdmin, create_super_admin};
use scholaris_cli::templates::{STANDARD_SUBJECTS, seed_templates};

#[derive(Parser)]
#[command(name = "scholaris-cli")]
#[command(about = "Scholaris CLI - Administrative tools for Scholaris", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a super admin account
    CreateSuperAdmin {
        /// First name of the super admin
        #[arg(short = 'f', long)]
        first_name: Option<String>,

        /// Last name of the super admin
        #[arg(short = 'l', long)]
        last_name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Create template classes "Class 1".."Class N" with the standard subjects
    SeedTemplates {
        /// Number of template classes
        #[arg(short = 'c', long, default_value = "12")]
        classes: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match Cli::parse().command {
        Commands::CreateSuperAdmin {
            first_name,
            last_name,
            email,
            password,
        } => {
            let first_name = prompt_unless_given(first_name, "First name")?;
            let last_name = prompt_unless_given(last_name, "Last name")?;
            let email = prompt_unless_given(email, "Email address")?;
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()?,
            };

            let admin = NewSuperAdmin {
                first_name: &first_name,
                last_name: &last_name,
                email: &email,
                password: &password,
            };
            let id = create_super_admin(&pool, &admin).await?;

            println!("\n✅ Super admin created successfully!");
            println!("   ID: {id}");
            println!("   Email: {email}");
            println!("   Name: {first_name} {last_name}");
        }
        Commands::SeedTemplates { classes } => {
            println!("📚 Seeding {classes} template classes...");
            let report = seed_templates(&pool, classes, STANDARD_SUBJECTS).await?;

            println!(
                "   ✓ {} classes and {} subjects created ({} subjects already present)",
                report.classes_created, report.subjects_created, report.subjects_existing
            );
        }
    }

    Ok(())
}

fn prompt_unless_given(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}
