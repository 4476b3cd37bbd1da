//! Built-in feed catalog, one [`Vertical`] per News Intelligence actor.
//!
//! A vertical names its feeds (a named source may bundle several URLs), the
//! categories the analyst may assign, and the sentiment labels it accepts.

use std::error::Error;
use std::fmt;

/// A topical actor: its feeds and its analysis vocabulary.
#[derive(Debug)]
pub struct Vertical {
    pub name: &'static str,
    pub topic: &'static str,
    pub sources: &'static [(&'static str, &'static [&'static str])],
    pub categories: &'static [&'static str],
    pub sentiment_options: &'static [&'static str],
    /// Used when the analyst answers with a label outside `sentiment_options`.
    pub default_sentiment: &'static str,
}

/// Which feeds of a vertical a run should read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelector {
    All,
    Named(String),
    Custom(String),
}

impl fmt::Display for SourceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceSelector::All => f.write_str("all"),
            SourceSelector::Named(name) => f.write_str(name),
            SourceSelector::Custom(url) => write!(f, "custom ({url})"),
        }
    }
}

impl SourceSelector {
    /// Interpret the `source` input. `custom` requires a custom feed URL.
    pub fn parse(source: &str, custom_feed_url: Option<&str>) -> Result<Self, Box<dyn Error>> {
        match source.trim() {
            "all" => Ok(SourceSelector::All),
            "custom" => match custom_feed_url.map(str::trim).filter(|u| !u.is_empty()) {
                Some(url) => Ok(SourceSelector::Custom(url.to_string())),
                None => Err("source \"custom\" requires a custom feed URL".into()),
            },
            "" => Err("source selector is empty".into()),
            name => Ok(SourceSelector::Named(name.to_string())),
        }
    }
}

impl Vertical {
    /// Key-value namespace holding this vertical's processed links.
    pub fn store_namespace(&self) -> String {
        format!("processed-urls-{}", self.name)
    }

    pub fn source_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sources.iter().map(|(name, _)| *name)
    }

    /// Resolve a selector to feed URLs in catalog order.
    pub fn resolve(&self, selector: &SourceSelector) -> Result<Vec<String>, Box<dyn Error>> {
        match selector {
            SourceSelector::All => Ok(self
                .sources
                .iter()
                .flat_map(|(_, urls)| urls.iter().map(|u| u.to_string()))
                .collect()),
            SourceSelector::Custom(url) => Ok(vec![url.clone()]),
            SourceSelector::Named(name) => self
                .sources
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, urls)| urls.iter().map(|u| u.to_string()).collect())
                .ok_or_else(|| {
                    format!(
                        "unknown source \"{name}\" for vertical \"{}\" (known: all, custom, {})",
                        self.name,
                        self.source_names().collect::<Vec<_>>().join(", ")
                    )
                    .into()
                }),
        }
    }

    /// Map an analyst sentiment onto this vertical's vocabulary.
    pub fn normalize_sentiment(&self, sentiment: &str) -> String {
        let sentiment = sentiment.trim();
        if self.sentiment_options.contains(&sentiment) {
            sentiment.to_string()
        } else {
            self.default_sentiment.to_string()
        }
    }
}

/// Look up a built-in vertical by name.
pub fn vertical(name: &str) -> Result<&'static Vertical, Box<dyn Error>> {
    VERTICALS
        .iter()
        .find(|v| v.name == name)
        .ok_or_else(|| {
            format!(
                "unknown actor \"{name}\" (known: {})",
                VERTICALS.iter().map(|v| v.name).collect::<Vec<_>>().join(", ")
            )
            .into()
        })
}

pub static VERTICALS: &[Vertical] = &[
    Vertical {
        name: "health-fitness",
        topic: "Health & Fitness",
        sources: &[
            ("mens-health", &["https://www.menshealth.com/rss/all.xml/"]),
            ("myfitnesspal", &["https://blog.myfitnesspal.com/feed"]),
            ("born-fitness", &["https://www.bornfitness.com/feed/"]),
            ("breaking-muscle", &["https://breakingmuscle.com/feed/"]),
            ("nasm", &["https://blog.nasm.org/rss.xml"]),
            ("precision-nutrition", &["https://www.precisionnutrition.com/feed"]),
            ("nutritionfacts", &["https://nutritionfacts.org/feed/"]),
            ("athletechnews", &["https://athletechnews.com/feed"]),
            ("club-solutions", &["https://clubsolutionsmagazine.com/feed/"]),
        ],
        categories: &[
            "General Fitness/Training",
            "Nutrition/Recipes",
            "Wellness/Lifestyle",
            "Medical News/Research",
            "Fitness Business/Tech",
            "Product/Gear",
            "General Health",
        ],
        sentiment_options: &[
            "High Importance (e.g., medical warning)",
            "Medium Importance (e.g., new study)",
            "General Info/Tip",
        ],
        default_sentiment: "General Info/Tip",
    },
    Vertical {
        name: "cybersecurity",
        topic: "Cybersecurity",
        sources: &[
            ("the-hacker-news", &["https://feeds.feedburner.com/TheHackersNews"]),
            ("krebsonsecurity", &["https://krebsonsecurity.com/feed/"]),
            ("dark-reading", &["https://www.darkreading.com/rss.xml"]),
            ("schneier", &["https://www.schneier.com/feed/atom"]),
            ("cisa-advisories", &["https://www.cisa.gov/cybersecurity-advisories/all.xml"]),
            ("bleepingcomputer", &["https://www.bleepingcomputer.com/feed/"]),
            ("google-security", &["https://googleonlinesecurity.blogspot.com/atom.xml"]),
            ("arstechnica-security", &["https://arstechnica.com/tag/security/feed"]),
        ],
        categories: &[
            "Vulnerability/CVE",
            "Malware/Ransomware",
            "Policy/Compliance",
            "Data Breach/Hack",
            "Threat Intelligence",
            "Cloud Security",
            "IoT/Hardware",
            "General InfoSec",
        ],
        sentiment_options: &["High Risk", "Medium Risk", "Low Risk/Informational"],
        default_sentiment: "Low Risk/Informational",
    },
    Vertical {
        name: "world-news",
        topic: "World News",
        sources: &[
            (
                "technology",
                &[
                    "https://www.bbc.co.uk/news/technology/rss.xml",
                    "https://techcrunch.com/feed/",
                    "https://www.zdnet.com/topic/technology/rss.xml",
                ],
            ),
            (
                "business",
                &[
                    "https://feeds.bloomberg.com/business/news.rss",
                    "https://www.cnbc.com/id/100003114/device/rss/rss.html",
                    "https://hbr.org/feed",
                ],
            ),
            (
                "world",
                &[
                    "http://feeds.bbci.co.uk/news/world/rss.xml",
                    "https://rss.nytimes.com/services/xml/rss/nyt/World.xml",
                ],
            ),
        ],
        categories: &[
            "Politics/Government",
            "Conflict/Security",
            "Economy/Trade",
            "Environment/Climate",
            "Health/Science",
            "Human Rights/Social Issues",
            "Technology",
            "Disaster/Accident",
        ],
        sentiment_options: &["Positive", "Neutral", "Negative"],
        default_sentiment: "Neutral",
    },
    Vertical {
        name: "luxury",
        topic: "Luxury & Lifestyle",
        sources: &[
            (
                "luxury-daily",
                &[
                    "https://www.luxurydaily.com/category/resources/news-briefs/feed/",
                    "https://www.luxurydaily.com/category/news/research/feed/",
                    "https://www.luxurydaily.com/category/news/commerce-news/feed/rss/",
                ],
            ),
            (
                "luxury-sectors",
                &[
                    "https://www.luxurydaily.com/category/sectors/apparel-and-accessories/feed/rss/",
                    "https://www.luxurydaily.com/category/sectors/automotive-industry-sectors/feed/rss/",
                    "https://www.luxurydaily.com/category/sectors/financial-services/feed/rss/",
                ],
            ),
        ],
        categories: &[
            "Luxury Retail/Apparel",
            "Automotive/Yachts/Aviation",
            "Travel/Hospitality/Experiences",
            "High-End Real Estate/Design",
            "Watches/Jewelry",
            "Art/Collectibles/Auctions",
            "Wealth Management/High Net Worth (HNW) Trends",
            "Digital Luxury/Web3/Metaverse",
        ],
        sentiment_options: &[
            "Brand Growth",
            "Market Downturn",
            "Acquisition/Partnership",
            "Informational",
        ],
        default_sentiment: "Informational",
    },
    Vertical {
        name: "foodtech",
        topic: "FoodTech & Agriculture",
        sources: &[
            ("agfundernews", &["https://agfundernews.com/feed"]),
            ("igrownews", &["https://igrownews.com/feed/"]),
            ("agriculturedive", &["https://www.agriculturedive.com/feeds/news/"]),
            ("foodnavigator", &["https://www.foodnavigator.com/arc/outboundfeeds/rss/"]),
            ("foodnavigator-usa", &["https://www.foodnavigator-usa.com/arc/outboundfeeds/rss/"]),
        ],
        categories: &[
            "Precision/AgriTech",
            "Alternative Proteins/Cell-Based",
            "Supply Chain/Logistics",
            "Food Safety/Regulation",
            "Vertical/Controlled Environment Agriculture (CEA)",
            "Venture Capital/M&A",
            "Sustainable Farming/Climate Tech",
            "Consumer Food Trends/Delivery",
        ],
        sentiment_options: &[
            "Investment/Growth",
            "Regulatory/Policy Change",
            "Innovation/Adoption",
            "Informational",
        ],
        default_sentiment: "Informational",
    },
    Vertical {
        name: "social-media",
        topic: "Social Media & Influencer Marketing",
        sources: &[
            ("later", &["https://later.com/rss.xml"]),
            ("influencer-marketing-hub", &["https://influencermarketinghub.com/feed"]),
            ("sproutsocial", &["https://sproutsocial.com/insights/feed/"]),
            ("upfluence", &["https://www.upfluence.com/feed"]),
            ("modash", &["https://www.modash.io/blog/rss.xml"]),
        ],
        categories: &[
            "Platform News",
            "Strategy/Trends",
            "Influencer Marketing",
            "Analytics/Tools",
            "Case Study/Campaign",
            "Regulation/Policy",
            "General Marketing",
        ],
        sentiment_options: &["High Impact", "Medium Impact", "Low Impact/Informational"],
        default_sentiment: "Low Impact/Informational",
    },
    Vertical {
        name: "global-markets",
        topic: "Global Markets",
        sources: &[
            (
                "geopolitics",
                &[
                    "http://feeds.bbci.co.uk/news/world/rss.xml",
                    "https://www.economist.com/latest/rss.xml",
                    "https://www.axios.com/rss/feed/all",
                ],
            ),
            (
                "markets",
                &[
                    "https://www.investing.com/rss/news.rss",
                    "https://www.investing.com/rss/news_1060.rss",
                    "https://www.ft.com/rss/world/economy",
                ],
            ),
            (
                "regulation",
                &[
                    "https://www.fsb.org/wordpress/content_type/policy-documents/feed/",
                    "https://www.fsb.org/wordpress/content_type/announcements/feed/",
                ],
            ),
        ],
        categories: &[
            "Monetary Policy",
            "Trade/Tariffs",
            "Market Data/Indices",
            "Corporate M&A",
            "Industry Regulation",
            "Technology/FinTech",
            "Commodities/Energy",
            "Geopolitical Risk",
        ],
        sentiment_options: &["Positive", "Neutral", "Negative"],
        default_sentiment: "Neutral",
    },
];
