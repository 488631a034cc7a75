pub mod browserless;
pub mod firecrawl;

pub use browserless::BrowserlessAutomation;
pub use firecrawl::FirecrawlSearch;
