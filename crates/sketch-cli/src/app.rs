use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use sketch_core::{
    export_file_name, Config, CredentialStore, FileKeyValueStore, HistoryCache,
    KeyValueStore,
};
use sketch_llm::DiagramGenerator;

/// Everything one invocation needs, wired from a single [`Config`].
pub struct App {
    config: Config,
    credentials: CredentialStore,
    history: HistoryCache,
    generator: DiagramGenerator,
}

impl App {
    pub fn from_env(data_dir: Option<PathBuf>) -> Self {
        let Some(dir) = data_dir else {
            return Self::new(Config::new());
        };
        let mut config = Config::load_from(&dir).with_overrides(|key| std::env::var(key).ok());
        config.data_dir = dir;
        Self::new(config)
    }

    pub fn new(config: Config) -> Self {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&config.data_dir));
        let credentials = CredentialStore::new(storage.clone());
        let history = HistoryCache::new(storage);
        let generator = DiagramGenerator::from_config(credentials.clone(), &config);

        Self {
            config,
            credentials,
            history,
            generator,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    pub async fn generate<W: Write>(
        &self,
        prompt: &str,
        record: bool,
        out: &mut W,
    ) -> anyhow::Result<()> {
        if !self.credentials.is_configured().await {
            eprintln!(
                "{}",
                "No API key stored, producing an example diagram. Run `sketcher key set` to use OpenAI."
                    .yellow()
            );
        }

        let diagram = self.generator.generate(prompt).await?;
        if record {
            self.history.record(&diagram).await?;
        }

        writeln!(out, "{}", diagram)?;
        Ok(())
    }

    pub async fn set_key<W: Write>(&self, value: &str, out: &mut W) -> anyhow::Result<()> {
        self.credentials.set(value).await?;
        writeln!(out, "{}", "API key saved".green())?;
        Ok(())
    }

    pub async fn show_key<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        match self.credentials.masked().await {
            Some(masked) => writeln!(out, "{}", masked)?,
            None => writeln!(out, "{}", "No API key stored".dimmed())?,
        }
        Ok(())
    }

    pub async fn clear_key<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        self.credentials.clear().await?;
        writeln!(out, "{}", "API key removed".green())?;
        Ok(())
    }

    pub async fn list_history<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        let entries = self.history.load().await;
        if entries.is_empty() {
            writeln!(out, "{}", "No recent diagrams".dimmed())?;
            return Ok(());
        }

        for entry in entries {
            writeln!(out, "{}  {}", entry.id.cyan(), entry.name)?;
        }
        Ok(())
    }

    pub async fn show_history<W: Write>(&self, id: &str, out: &mut W) -> anyhow::Result<()> {
        let entry = self
            .history
            .get(id)
            .await
            .with_context(|| format!("No recent diagram with id {}", id))?;
        writeln!(out, "{}", entry.code)?;
        Ok(())
    }

    pub async fn clear_history<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        self.history.clear().await?;
        writeln!(out, "{}", "Recent diagrams cleared".green())?;
        Ok(())
    }

    pub async fn record_file<W: Write>(&self, file: &Path, out: &mut W) -> anyhow::Result<()> {
        let code = read_diagram(file)?;
        let entry = self.history.record(&code).await?;
        writeln!(out, "{}  {}", entry.id.cyan(), entry.name)?;
        Ok(())
    }

    pub fn export_name<W: Write>(&self, file: &Path, out: &mut W) -> anyhow::Result<()> {
        let code = read_diagram(file)?;
        writeln!(out, "{}", export_file_name(&code))?;
        Ok(())
    }
}

fn read_diagram(file: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}
