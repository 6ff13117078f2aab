//! `summarize`: model-written overview of the scenes.

use bucketscope_core::navigation::Navigator;
use bucketscope_core::summary::SummaryService;

pub async fn run(navigator: &mut Navigator, summary: &SummaryService) {
    match navigator.summarize(summary).await {
        Some(text) => println!("{text}"),
        None => println!("No scenes found at this path."),
    }
}
