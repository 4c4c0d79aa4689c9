use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "lead-crm")]
#[command(about = "Lead capture CRM: SQLite store, Google Sheets mirror, WhatsApp notify")]
pub struct CliArgs {
    /// Path to TOML configuration file (environment only when omitted)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen address, overrides server.listen
    #[arg(long)]
    pub listen: Option<String>,

    /// SQLite database path, overrides database.path
    #[arg(long)]
    pub database: Option<String>,

    /// Create the leads table and exit
    #[arg(long)]
    pub init_db: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn apply_overrides(&self, config: &mut super::CrmConfig) {
        if let Some(listen) = &self.listen {
            config.server.listen = listen.clone();
        }
        if let Some(database) = &self.database {
            config.database.path = database.clone();
        }
    }
}
