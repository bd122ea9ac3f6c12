//! Article listing scrapers.
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Habr search | [`habr`] | HTML scraping of the date-ordered post search |
//!
//! A scraper exports `fetch_articles(config)`, which performs one request and
//! returns a page of listing entries. Failures are logged and yield an empty
//! page; they never reach the caller.

pub mod habr;
