use crate::config::HarvestConfig;
use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::error::ConfigError;
use crate::extractor::DocumentExtractor;
use crate::filter::{LinkFilter, Rejection};
use crate::results::{Article, DiscoveredLink, DocumentRecord, LinkRecord};
use crate::store::JsonlStore;
use crate::transport::Fetcher;
use crate::walker::{PageOutcome, PageWalker};
use std::collections::HashSet;
use std::io;
use std::sync::Arc;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    pub new_links: usize,
    pub total_links: usize,
    pub new_articles: usize,
    pub total_articles: usize,
}

/// Drives the page walkers and the document extractor over one configuration
pub struct Harvester {
    config: HarvestConfig,
    walkers: Vec<PageWalker>,
    extractor: DocumentExtractor,
    filter: LinkFilter,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Harvester {
    /// Validates the configuration and builds one walker per listing template
    pub fn new(
        config: HarvestConfig,
        fetcher: Arc<dyn Fetcher>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, ConfigError> {
        let walkers = config
            .listing_templates()
            .iter()
            .map(|template| {
                PageWalker::new(
                    Arc::clone(&fetcher),
                    Arc::clone(&diagnostics),
                    &config.listing,
                    &config.base_url,
                    template,
                    &config.page_placeholder,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let extractor =
            DocumentExtractor::new(fetcher, Arc::clone(&diagnostics), &config.document)?;
        let filter = LinkFilter::new(&config.filter)?;

        Ok(Self {
            config,
            walkers,
            extractor,
            filter,
            diagnostics,
        })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    pub fn walkers(&self) -> &[PageWalker] {
        &self.walkers
    }

    pub fn extractor(&self) -> &DocumentExtractor {
        &self.extractor
    }

    pub fn store(&self) -> JsonlStore {
        JsonlStore::new(self.config.link_path(), self.config.article_path())
    }

    async fn pause(&self) {
        let delay = self.config.delay();
        if !delay.is_zero() {
            ::log::debug!("Sleeping for {:?}...", delay);
            tokio::time::sleep(delay).await;
        }
    }

    /// Walks one listing from `start_page` until pagination ends.
    ///
    /// Each page's admitted links are journaled before the next page is requested.
    /// Failed pages contribute nothing and the walk moves on, unless
    /// `max_consecutive_failures` pages in a row have failed. The optional
    /// `max_num_pages` caps how many pages are requested.
    pub async fn walk_pages(
        &self,
        walker: &PageWalker,
        filter: &mut LinkFilter,
        journal: Option<&JsonlStore>,
    ) -> Vec<DiscoveredLink> {
        let mut links = Vec::new();
        let mut page = self.config.start_page;
        let mut page_count = 0;
        let mut failures = 0;

        loop {
            let found = match walker.fetch_page(page).await {
                PageOutcome::EndOfPagination => {
                    ::log::info!("No more links found, stopping...");
                    break;
                }
                PageOutcome::Failed(_) => {
                    failures += 1;
                    Vec::new()
                }
                PageOutcome::Links(found) => {
                    failures = 0;
                    found
                }
            };

            let page_url = walker.page_url(page);
            for link in found {
                let link = DiscoveredLink {
                    link,
                    page,
                    page_url: page_url.clone(),
                };
                if admit(filter, &link, journal) {
                    links.push(link);
                }
            }

            page += 1;
            page_count += 1;

            let limit = self.config.max_consecutive_failures;
            if limit > 0 && failures >= limit {
                self.diagnostics.record(DiagnosticEvent::WalkAbandoned {
                    url: page_url,
                    failures,
                });
                break;
            }
            if self.config.max_num_pages.is_some_and(|max| page_count >= max) {
                ::log::info!("Reached max number of pages, stopping...");
                break;
            }
            self.pause().await;
        }

        links
    }

    /// Walks every listing and keeps the links not already known
    pub async fn walk_links(
        &self,
        known_urls: impl IntoIterator<Item = String>,
        journal: Option<&JsonlStore>,
    ) -> Vec<DiscoveredLink> {
        let mut filter = self.filter.clone().with_known(known_urls);
        let mut links = Vec::new();

        for walker in &self.walkers {
            ::log::info!("Fetching links for url: {}", walker.page_url(self.config.start_page));
            links.extend(self.walk_pages(walker, &mut filter, journal).await);
        }

        ::log::info!("Total links fetched: {}", links.len());
        links
    }

    /// One extraction per link, in order; `None` where no record was produced
    pub async fn extract_documents(&self, links: &[LinkRecord]) -> Vec<Option<DocumentRecord>> {
        let mut records = Vec::with_capacity(links.len());
        for (i, link) in links.iter().enumerate() {
            records.push(self.extractor.fetch_document(&link.url).await);
            if i + 1 < links.len() {
                self.pause().await;
            }
        }
        records
    }

    /// Extracts documents for links that do not have an article yet
    pub async fn harvest_articles(
        &self,
        links: &[DiscoveredLink],
        known_article_urls: &HashSet<String>,
        journal: Option<&JsonlStore>,
    ) -> Vec<Article> {
        let mut articles = Vec::new();
        let mut attempts = 0;

        for (i, link) in links.iter().enumerate() {
            if known_article_urls.contains(link.url()) && !self.config.overwrite_existing {
                ::log::debug!(
                    "Article [{}]({}) already exists, skipping...",
                    link.link.title,
                    link.url()
                );
                continue;
            }
            if self
                .config
                .max_num_articles
                .is_some_and(|max| attempts >= max)
            {
                ::log::info!("Reached max number of articles, stopping...");
                break;
            }
            if attempts > 0 {
                self.pause().await;
            }
            attempts += 1;

            let Some(document) = self.extractor.fetch_document(link.url()).await else {
                ::log::info!(
                    "Article [{}]({}) does not exist, skipping...",
                    link.link.title,
                    link.url()
                );
                continue;
            };

            let article = Article::new(link.clone(), document);
            if let Some(store) = journal {
                if let Err(e) = store.append_article(&article) {
                    ::log::warn!("Failed to journal article {}: {}", article.url(), e);
                }
            }
            articles.push(article);

            if self.config.print_every > 0 && (i + 1) % self.config.print_every == 0 {
                ::log::info!("Article [{}]({}) scraped", link.link.title, link.url());
            }
        }

        ::log::info!("Total articles scraped: {}", articles.len());
        articles
    }

    /// Full run: walk listings, save links, extract documents, save articles
    pub async fn run(&self, links_only: bool) -> io::Result<HarvestSummary> {
        let store = self.store();

        let mut all_links = store.load_links()?;
        let known = all_links
            .iter()
            .map(|link| link.url().to_string())
            .collect::<Vec<_>>();
        let new_links = self.walk_links(known, Some(&store)).await;
        let new_link_count = new_links.len();
        if new_links.is_empty() {
            ::log::info!("No more links found");
        }
        all_links.extend(new_links);
        let all_links = store.save_links(all_links)?;

        let mut summary = HarvestSummary {
            new_links: new_link_count,
            total_links: all_links.len(),
            ..HarvestSummary::default()
        };
        if links_only {
            return Ok(summary);
        }

        let existing = store.load_articles()?;
        let known_articles = existing
            .iter()
            .map(|article| article.url().to_string())
            .collect::<HashSet<_>>();
        let new_articles = self
            .harvest_articles(&all_links, &known_articles, Some(&store))
            .await;
        summary.new_articles = new_articles.len();

        let replaced = new_articles
            .iter()
            .map(|article| article.url().to_string())
            .collect::<HashSet<_>>();
        let mut all_articles = existing
            .into_iter()
            .filter(|article| !replaced.contains(article.url()))
            .collect::<Vec<_>>();
        all_articles.extend(new_articles);
        summary.total_articles = store.save_articles(all_articles)?.len();

        Ok(summary)
    }
}

/// Filters a link and journals it when admitted
fn admit(filter: &mut LinkFilter, link: &DiscoveredLink, journal: Option<&JsonlStore>) -> bool {
    match filter.admit(link.url()) {
        Ok(()) => {
            if let Some(store) = journal {
                if let Err(e) = store.append_link(link) {
                    ::log::warn!("Failed to journal link {}: {}", link.url(), e);
                }
            }
            true
        }
        Err(Rejection::AlreadyKnown) => {
            ::log::info!("Link {} already exists, skipping...", link.url());
            false
        }
        Err(reason) => {
            ::log::debug!("Link {} filtered out: {:?}", link.url(), reason);
            false
        }
    }
}
