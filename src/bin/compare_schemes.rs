//! Project both pension schemes to an as-of month and export the monthly series
//!
//! Prints the comparison summary and writes both series to CSV

use anyhow::{Context, Result};
use clap::Parser;
use pension_compare::params::load_params_or_default;
use pension_compare::{compare, project, BetterScheme, ProjectionSeries, Session, YearMonth};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Compare pension Scheme 58 against Scheme 60")]
struct Args {
    /// JSON parameter file; dashboard defaults are used when omitted
    #[arg(long)]
    params: Option<PathBuf>,

    /// Project up to this month (YYYY-MM); defaults to five years from today
    #[arg(long)]
    as_of: Option<YearMonth>,

    /// CSV output path
    #[arg(long, default_value = "scheme_comparison.csv")]
    output: PathBuf,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn write_series(writer: &mut csv::Writer<std::fs::File>, series: &ProjectionSeries) -> Result<()> {
    let scheme = series.scheme().to_string();
    for r in series {
        writer.write_record([
            scheme.clone(),
            r.month_index.to_string(),
            r.date.to_string(),
            format!("{:.2}", r.contribution),
            format!("{:.2}", r.growth),
            format!("{:.2}", r.payout),
            format!("{:.2}", r.tax_deducted),
            format!("{:.2}", r.balance),
            format!("{:.2}", r.sip_balance),
            format!("{:.2}", r.cumulative_contributions),
            format!("{:.2}", r.cumulative_payouts),
            format!("{:.2}", r.cumulative_tax),
            format!("{:.2}", r.reinvested_value),
            format!("{:.2}", r.reinvestment_tax),
        ])?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let params = load_params_or_default(args.params.as_ref())
        .context("Failed to load parameters")?;

    let as_of = match args.as_of {
        Some(month) => month,
        None => Session::new(params.clone(), chrono::Local::now().date_naive())?.cursor(),
    };

    let (scheme58, scheme60) = project(&params, as_of)?;
    let summary = compare(&scheme58, &scheme60)?;

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;
    writer.write_record([
        "Scheme", "Month", "Date", "Contribution", "Growth", "Payout", "TaxDeducted",
        "Balance", "SipBalance", "CumulativeContributions", "CumulativePayouts", "CumulativeTax",
        "ReinvestedValue", "ReinvestmentTax",
    ])?;
    write_series(&mut writer, &scheme58)?;
    write_series(&mut writer, &scheme60)?;
    writer.flush()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Projection from {} to {}", params.lump_sum_month(), as_of);
        for (rank, (scheme, value)) in summary.ranking().iter().enumerate() {
            println!("  {}. {} ({:.2})", rank + 1, scheme, value);
        }
        println!(
            "  Reinvested pensions: Scheme 58 {:.2}, Scheme 60 {:.2}",
            summary.scheme58_reinvested_value, summary.scheme60_reinvested_value
        );
        for (scheme, account_tax, reinvestment_tax) in summary.tax_split() {
            println!(
                "  Tax paid by {}: {:.2} on the account, {:.2} on reinvestment interest",
                scheme, account_tax, reinvestment_tax
            );
        }
        match summary.better_scheme {
            BetterScheme::Tie => println!("  Both schemes end level"),
            BetterScheme::Scheme58 => println!("  Scheme 58 ends ahead"),
            BetterScheme::Scheme60 => println!("  Scheme 60 ends ahead"),
        }
        if summary.overtakes.is_empty() {
            println!("  No lead changes");
        }
        for event in &summary.overtakes {
            println!("  {}", event.describe());
        }
    }

    println!("Series written to {}", args.output.display());
    Ok(())
}
