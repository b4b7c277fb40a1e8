use crate::cli::ui;
use crate::market_data::{NewsArticle, NewsProvider};
use anyhow::Result;
use console::style;

pub fn render(articles: &[NewsArticle]) {
    println!("{}\n", ui::style_text("Market News", ui::StyleType::Title));
    for article in articles {
        println!("{}", style(&article.title).bold());
        if !article.description.is_empty() {
            println!("  {}", article.description);
        }
        println!(
            "  {}",
            style(format!("{} | {}", article.source, article.published_at)).dim()
        );
        println!();
    }
}

pub async fn show(news: &dyn NewsProvider) -> Result<()> {
    let spinner = ui::new_fetch_spinner("Fetching headlines...");
    let articles = news.fetch_headlines().await?;
    spinner.finish_and_clear();
    render(&articles);
    Ok(())
}
