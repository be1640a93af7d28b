use sea_orm::Database;
use sea_orm_migration::prelude::*;

const DEFAULT_DATABASE_URL: &str = "sqlite:./folio.db?mode=rwc";

/// Migration commands understood by the `migration` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    /// Roll back the last applied migration only.
    Down,
    Fresh,
    /// Roll back everything, then apply everything again.
    Refresh,
    Status,
}

impl Step {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.unwrap_or("up") {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "fresh" => Some(Self::Fresh),
            "refresh" => Some(Self::Refresh),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let arg = std::env::args().nth(1);
    let Some(step) = Step::parse(arg.as_deref()) else {
        eprintln!("usage: migration [up|down|fresh|refresh|status] (DATABASE_URL picks the database)");
        std::process::exit(2);
    };

    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let db = Database::connect(&url).await?;

    match step {
        Step::Up => migration::Migrator::up(&db, None).await?,
        Step::Down => migration::Migrator::down(&db, Some(1)).await?,
        Step::Fresh => migration::Migrator::fresh(&db).await?,
        Step::Refresh => migration::Migrator::refresh(&db).await?,
        Step::Status => migration::Migrator::status(&db).await?,
    }
    println!("{step:?} done on {url}");

    Ok(())
}
