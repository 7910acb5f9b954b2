//! Main application orchestration and execution

use crate::{
    cli::{supports_color, Cli, Command, ScheduleArgs},
    config::{display_settings_summary, load_settings, EnvManager},
    directory::ServerDirectory,
    error::{AppError, Result},
    lock::RunGuard,
    models::{ServerCandidate, Settings},
    output::ReportWriter,
    runner::MeasurementRunner,
    schedule::Cadence,
    store::{ConfigSource, ConfigStore},
};
use std::path::Path;

/// Main application struct that dispatches one CLI command
pub struct App {
    cli: Cli,
    settings: Settings,
}

impl App {
    /// Load settings for the given command line
    pub fn new(cli: Cli) -> Result<Self> {
        let mut settings = load_settings(cli.clone())?;

        // Colors stay on only for terminals unless explicitly forced
        if !cli.color {
            settings.enable_color = settings.enable_color && supports_color();
        }
        colored::control::set_override(settings.enable_color);

        Ok(Self { cli, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn run(self) -> Result<()> {
        if self.settings.debug {
            println!("\nSettings Summary:");
            println!("{}", display_settings_summary(&self.settings));
            println!();
        }

        match self.cli.command() {
            Command::Run => self.measure().await,
            Command::Search { term } => self.search(&term).await,
            Command::Pin { term, pick } => self.pin(&term, pick).await,
            Command::Unpin => self.unpin().await,
            Command::Show => self.show().await,
            Command::Schedule(args) => self.schedule(&args),
            Command::Env { write } => self.env(write.as_deref()),
        }
    }

    /// One measurement-and-report pass
    async fn measure(&self) -> Result<()> {
        let _guard = RunGuard::acquire(&self.settings.lock_path, self.settings.lock_stale_after())?;

        let mut runner = MeasurementRunner::from_settings(&self.settings)?;
        let run = runner.run().await?;

        let writer = ReportWriter::new(self.settings.report_path.clone(), self.settings.enable_color);
        writer.write(&run).await?;

        if self.settings.verbose {
            println!("\nReport written to {}", writer.path().display());
        }

        Ok(())
    }

    async fn lookup(&self, term: &str) -> Result<Vec<ServerCandidate>> {
        let directory = ServerDirectory::from_settings(&self.settings)?;

        if self.settings.verbose {
            println!("Searching {} for '{}'...", self.settings.directory_url, term);
        }

        directory.search(term).await
    }

    async fn search(&self, term: &str) -> Result<()> {
        let candidates = self.lookup(term).await?;

        if candidates.is_empty() {
            println!("No servers found matching '{}'", term);
            return Ok(());
        }

        println!("Servers matching '{}':", term);
        for (index, candidate) in candidates.iter().enumerate() {
            println!("{}", format_candidate(index + 1, candidate));
        }

        Ok(())
    }

    async fn pin(&self, term: &str, pick: usize) -> Result<()> {
        let candidates = self.lookup(term).await?;

        if candidates.is_empty() {
            return Err(AppError::validation(format!("No servers found matching '{}'", term)));
        }

        let candidate = candidates.get(pick.wrapping_sub(1)).ok_or_else(|| {
            AppError::validation(format!(
                "--pick {} is out of range; the search returned {} server(s)",
                pick,
                candidates.len()
            ))
        })?;

        let identity = candidate.identity();
        ConfigStore::new(self.settings.pinned_config_path.clone())
            .save(&identity)
            .await?;

        println!("Pinned server: {} [{}]", identity.display_name(), identity.id);
        Ok(())
    }

    async fn unpin(&self) -> Result<()> {
        ConfigStore::new(self.settings.pinned_config_path.clone()).clear().await?;

        println!("Server pin removed; runs will use automatic server selection");
        Ok(())
    }

    async fn show(&self) -> Result<()> {
        let store = ConfigStore::new(self.settings.pinned_config_path.clone());
        let config = store.load().await?.into_config();

        match config.server() {
            Some(server) => println!("Pinned server: {} [{}]", server.display_name(), server.id),
            None => println!("No server pinned: automatic server selection"),
        }

        if self.settings.verbose {
            println!("Configuration file: {}", store.path().display());
        }

        Ok(())
    }

    fn schedule(&self, args: &ScheduleArgs) -> Result<()> {
        let cadence = Cadence::from_args(args)?;

        let executable = std::env::current_exe()
            .map_err(|e| AppError::io(format!("Failed to locate the wanmon executable: {}", e)))?;
        let workdir = std::env::current_dir()
            .map_err(|e| AppError::io(format!("Failed to read the working directory: {}", e)))?;

        let command = format!(
            "cd {} && {} run",
            shell_quote(&workdir.display().to_string()),
            shell_quote(&executable.display().to_string())
        );

        println!("Schedule: {}", cadence.describe());
        println!("{}", cadence.crontab_line(&command)?);
        println!();
        println!("Add the line above with 'crontab -e' to register it.");

        Ok(())
    }

    fn env(&self, write: Option<&Path>) -> Result<()> {
        match write {
            Some(path) => {
                EnvManager::save_example_env_file(path)?;
                println!("Example environment file written to {}", path.display());
            }
            None => print!("{}", EnvManager::display_env_help()),
        }

        Ok(())
    }
}

/// "N. sponsor - name (country) [id]"
pub fn format_candidate(position: usize, candidate: &ServerCandidate) -> String {
    format!("{}. {} [{}]", position, candidate.identity().display_name(), candidate.id)
}

fn shell_quote(text: &str) -> String {
    if !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:=@".contains(c))
    {
        text.to_string()
    } else {
        format!("'{}'", text.replace('\'', r"'\''"))
    }
}
