use anyhow::Result;
use tollmap::{Dashboard, ReportDate, SourceConfig, TollType};

// usage: cargo run --example dashboard -- [YYYY-MM-DD] [toll type] [country]
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let date = args.next().unwrap_or_else(|| ReportDate::default().to_string());
    let toll: TollType = match args.next() {
        Some(name) => name.parse()?,
        None => TollType::default(),
    };

    let dashboard = Dashboard::start(SourceConfig::default()).await?;
    let country = match args.next() {
        Some(country) => country,
        None => dashboard.default_country().unwrap_or("India").to_string(),
    };

    // a failed view leaves the other one standing
    match dashboard.map_view(&date, toll).await {
        Ok(points) => println!("{}", serde_json::to_string_pretty(&points)?),
        Err(e) => eprintln!("map not updated: {e}"),
    }
    match dashboard.pie_view(&date, &country).await {
        Ok(pie) => println!("{}", serde_json::to_string_pretty(&pie)?),
        Err(e) => eprintln!("pie chart not updated: {e}"),
    }

    Ok(())
}
