//! Source scrapers, one module per page collected into the record.
//!
//! # Sources
//!
//! | Source | Module | Method | Produces |
//! |--------|--------|--------|----------|
//! | Mars news index | [`news`] | browser, bounded wait | headline + teaser |
//! | JPL space images | [`featured_image`] | browser, button click | full-size image URL |
//! | Mars facts | [`facts`] | direct HTTP fetch | styled HTML table |
//! | Mars hemispheres | [`hemispheres`] | browser, index + detail pages | titled image URLs |
//!
//! # Common Patterns
//!
//! Each module exports a `scrape` function that never fails: internal steps
//! return `Result<_, ScrapeError>` and use `?`, and `scrape` turns any error
//! into a `warn!` plus an absent value. The page-parsing step of each module
//! is a plain `parse_*` function over markup so it can be tested without a
//! browser.

pub mod facts;
pub mod featured_image;
pub mod hemispheres;
pub mod news;
