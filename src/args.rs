use clap::Parser;
use page_harvest::HarvestConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "page-harvest")]
#[command(about = "Walks a paginated document index and extracts every listed document")]
#[command(version)]
pub struct Args {
    /// Path to the harvest configuration (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override the dataset output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Stop after this many listing pages
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Stop after this many document extractions
    #[arg(long)]
    pub max_articles: Option<usize>,

    /// WebDriver server URL; falls back to the WEBDRIVER_URL environment variable
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Re-extract documents that already have an article
    #[arg(long)]
    pub overwrite: bool,

    /// Only walk the listing; skip document extraction
    #[arg(long)]
    pub links_only: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut HarvestConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(max) = self.max_pages {
            config.max_num_pages = Some(max);
        }
        if let Some(max) = self.max_articles {
            config.max_num_articles = Some(max);
        }
        // Override the WebDriver URL with an environment variable if provided
        let webdriver_url = self
            .webdriver_url
            .clone()
            .or_else(|| std::env::var("WEBDRIVER_URL").ok());
        if let Some(url) = webdriver_url.filter(|url| !url.is_empty()) {
            config.transport.webdriver_url = url;
        }
        if self.overwrite {
            config.overwrite_existing = true;
        }
    }
}
