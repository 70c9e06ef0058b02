use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lazyserver", version, about = "TUI for browsing and editing chat servers")]
pub struct Args {
    /// Backend base URL (overrides `api.base_url`)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Open the edit dialog for this server ID once the list has loaded
    #[arg(short, long)]
    pub server: Option<String>,

    /// Catppuccin flavour (e.g. "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,
}
