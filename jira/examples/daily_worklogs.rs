//! Prints the hours an assignee has logged on a given day, per issue.
//!
//! `cargo run --example daily_worklogs -- <account id> 2024-01-10`
use chrono::NaiveDate;
use jira::builder::JiraBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let account_id = args.next().ok_or("Missing account id")?;
    let date = NaiveDate::parse_from_str(&args.next().ok_or("Missing date")?, "%Y-%m-%d")?;

    let jira = JiraBuilder::new().from_env().timeout(30).build()?;

    for issue in jira.search_issues_with_worklogs_on(&account_id, date).await? {
        let seconds: i64 = jira
            .get_worklogs_for(issue.key.as_str(), None)
            .await?
            .iter()
            .filter(|wl| wl.started.date_naive() == date)
            .map(|wl| wl.time_spent_seconds)
            .sum();
        println!("{:10} {:>6.1}h {}", issue.key.as_str(), seconds as f64 / 3600.0, issue.fields.summary);
    }
    Ok(())
}
