//! Sawdesk CLI
//!
//! Fetches reports from a running Sawdesk API server:
//! - Dashboard summary
//! - Blade and client reports
//! - Statistics (managers)
//! - Searches

use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "sawdesk-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sharpening shop reports from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Operator id sent as x-operator-id
    #[arg(short, long, global = true)]
    pub operator: Option<i64>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status
    Status,

    /// Today's work, weekly and monthly totals, blades needing attention
    Dashboard,

    /// Blade report with full history
    Blade {
        /// Blade id
        id: i64,
    },

    /// Client report with active blades
    Client {
        /// Client id
        id: i64,
        /// List blades with freshness status instead
        #[arg(long)]
        status: bool,
        /// Only blades last sharpened on or after this date
        #[arg(long)]
        since: Option<String>,
        /// Only blades last sharpened on or before this date
        #[arg(long)]
        until: Option<String>,
    },

    /// Aggregate statistics (managers only)
    Stats {
        /// Window start (default: one month before --until)
        #[arg(long)]
        since: Option<String>,
        /// Window end (default: now)
        #[arg(long)]
        until: Option<String>,
    },

    /// Search blades by code
    Blades {
        code: String,
    },

    /// Search clients by name
    Clients {
        name: String,
    },

    /// Search sharpening history
    History {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// EDGE, FACE or FULL
        #[arg(long)]
        kind: Option<String>,
    },
}

struct Api {
    client: reqwest::Client,
    base: String,
    operator: Option<i64>,
}

impl Api {
    async fn get(&self, path: &str, query: &[(&str, Option<String>)]) -> anyhow::Result<Value> {
        let params: Vec<(&str, String)> = query
            .iter()
            .filter_map(|(k, v)| v.clone().map(|v| (*k, v)))
            .collect();

        let mut request = self
            .client
            .get(format!("{}{}", self.base, path))
            .query(&params);
        if let Some(id) = self.operator {
            request = request.header("x-operator-id", id.to_string());
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body["message"].as_str().unwrap_or("no details");
            let hint = match status {
                StatusCode::UNAUTHORIZED => " (pass --operator <id>)",
                StatusCode::FORBIDDEN => " (a manager operator is required)",
                _ => "",
            };
            anyhow::bail!("Request failed ({}): {}{}", status, message, hint);
        }

        Ok(body)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = Api {
        client: reqwest::Client::new(),
        base: cli.api_url.trim_end_matches('/').to_string(),
        operator: cli.operator,
    };
    let json = cli.format == "json";

    match cli.command {
        Commands::Status => {
            let health = match api.get("/health", &[]).await {
                Ok(h) => h,
                Err(e) => {
                    eprintln!("Cannot reach Sawdesk API at {}", api.base);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the API server is running:");
                    eprintln!("  cargo run --bin sawdesk-api");
                    std::process::exit(1);
                }
            };

            if json {
                return print_json(&health);
            }
            println!("Sawdesk v{}", str_of(&health["version"]));
            println!();
            println!("API Status:   {}", str_of(&health["status"]));
            println!("Record store: {}", str_of(&health["store"]));
            if let Some(uptime) = health["uptime_seconds"].as_u64() {
                println!("Uptime:       {}", format_duration(uptime));
            }
        }

        Commands::Dashboard => {
            let data = api.get("/api/v1/dashboard-summary", &[]).await?;
            if json {
                return print_json(&data);
            }
            print_dashboard(&data);
        }

        Commands::Blade { id } => {
            let data = api.get(&format!("/api/v1/report/blade/{}", id), &[]).await?;
            if json {
                return print_json(&data);
            }

            let blade = &data["blade"];
            println!(
                "{} ({}) owned by {}",
                str_of(&blade["code"]),
                str_of(&blade["blade_type"]["name"]),
                str_of(&blade["client"]["name"])
            );
            print_breakdown("Sharpenings", &data["summary"]);
            println!();
            print_history(&data["history"]);
        }

        Commands::Client {
            id,
            status,
            since,
            until,
        } => {
            if status {
                let data = api
                    .get(
                        &format!("/api/v1/report/client/{}/blades", id),
                        &[("since", since), ("until", until)],
                    )
                    .await?;
                if json {
                    return print_json(&data);
                }
                print_client_blades(&data);
            } else {
                let data = api
                    .get(&format!("/api/v1/report/client/{}", id), &[])
                    .await?;
                if json {
                    return print_json(&data);
                }

                println!("{}", str_of(&data["client"]["name"]));
                println!(
                    "Blades: {}  Sharpenings: {}",
                    data["summary"]["total_blades"],
                    data["summary"]["total_sharpenings"]
                );
                for blade in data["blades"].as_array().into_iter().flatten() {
                    println!();
                    println!(
                        "== {} ({})",
                        str_of(&blade["code"]),
                        str_of(&blade["blade_type"]["name"])
                    );
                    print_history(&blade["history"]);
                }
            }
        }

        Commands::Stats { since, until } => {
            let data = api
                .get("/api/v1/statistics", &[("since", since), ("until", until)])
                .await?;
            if json {
                return print_json(&data);
            }
            print_statistics(&data);
        }

        Commands::Blades { code } => {
            let data = api.get("/api/v1/search/blades", &[("code", Some(code))]).await?;
            if json {
                return print_json(&data);
            }

            println!("{:<16} {:<20} {:<24} {}", "Code", "Type", "Client", "Last sharpened");
            println!("{}", "-".repeat(80));
            for blade in data["results"].as_array().into_iter().flatten() {
                println!(
                    "{:<16} {:<20} {:<24} {}",
                    str_of(&blade["code"]),
                    str_of(&blade["blade_type"]["name"]),
                    str_of(&blade["client"]["name"]),
                    date_of(&blade["last_sharpened_at"])
                );
            }
        }

        Commands::Clients { name } => {
            let data = api.get("/api/v1/search/clients", &[("name", Some(name))]).await?;
            if json {
                return print_json(&data);
            }

            println!("{:<6} {:<28} {}", "ID", "Name", "Phone");
            println!("{}", "-".repeat(50));
            for client in data["results"].as_array().into_iter().flatten() {
                println!(
                    "{:<6} {:<28} {}",
                    client["id"].to_string(),
                    str_of(&client["name"]),
                    str_of(&client["phone"])
                );
            }
        }

        Commands::History { from, to, kind } => {
            let data = api
                .get(
                    "/api/v1/search/history",
                    &[("from", from), ("to", to), ("kind", kind)],
                )
                .await?;
            if json {
                return print_json(&data);
            }

            println!(
                "{:<20} {:<6} {:<16} {:<24} {}",
                "When", "Kind", "Blade", "Client", "Operator"
            );
            println!("{}", "-".repeat(84));
            for hit in data["results"].as_array().into_iter().flatten() {
                println!(
                    "{:<20} {:<6} {:<16} {:<24} {}",
                    datetime_of(&hit["performed_at"]),
                    str_of(&hit["kind"]),
                    str_of(&hit["blade_code"]),
                    str_of(&hit["client"]["name"]),
                    str_of(&hit["operator"])
                );
            }
            println!();
            println!("{} records", data["total"]);
        }
    }

    Ok(())
}

fn print_json(data: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn print_dashboard(data: &Value) {
    let today = &data["today"];
    println!("Today: {} sharpenings", today["total"]);
    for entry in today["entries"].as_array().into_iter().flatten() {
        println!(
            "  {}  {:<5} {:<16} {:<24} {}",
            str_of(&entry["time"]),
            str_of(&entry["kind"]),
            str_of(&entry["blade_code"]),
            str_of(&entry["client_name"]),
            str_of(&entry["operator_name"])
        );
    }
    println!();
    print_breakdown("This week", &data["this_week"]);
    print_breakdown("This month", &data["this_month"]);

    let stale = data["blades_needing_attention"].as_array();
    let stale: Vec<&Value> = stale.into_iter().flatten().collect();
    println!();
    println!("Blades needing attention: {}", stale.len());
    for blade in stale {
        let days = match &blade["days_since_sharpened"] {
            Value::Number(n) => format!("{} days", n),
            _ => "never".to_string(),
        };
        println!(
            "  {:<16} {:<24} {}",
            str_of(&blade["code"]),
            str_of(&blade["client_name"]),
            days
        );
    }
}

fn print_client_blades(data: &Value) {
    println!("{}", str_of(&data["client"]["name"]));
    println!(
        "{:<16} {:<8} {:<12} {:>6} {:>8}  {}",
        "Code", "Active", "Last", "Total", "30 days", "Status"
    );
    println!("{}", "-".repeat(72));
    for blade in data["blades"].as_array().into_iter().flatten() {
        println!(
            "{:<16} {:<8} {:<12} {:>6} {:>8}  {}",
            str_of(&blade["code"]),
            if blade["active"].as_bool().unwrap_or(false) { "yes" } else { "no" },
            date_of(&blade["last_sharpened_at"]),
            blade["total_sharpenings"],
            blade["sharpened_last_30_days"],
            str_of(&blade["freshness"])
        );
    }

    let summary = &data["summary"];
    println!();
    println!(
        "{} blades, {} active",
        summary["total_blades"], summary["active_blades"]
    );
    if let Some(by) = summary["by_freshness"].as_object() {
        for (status, count) in by {
            println!("  {:<16} {}", status, count);
        }
    }
}

fn print_statistics(data: &Value) {
    let window = &data["window"];
    println!(
        "{} to {}",
        datetime_of(&window["since"]),
        datetime_of(&window["until"])
    );

    let totals = &data["totals"];
    println!();
    println!("Sharpenings:      {}", totals["sharpenings"]);
    println!("Clients served:   {}", totals["clients_served"]);
    println!("Blades sharpened: {}", totals["blades_sharpened"]);
    println!("Daily average:    {}", data["daily_average"]);

    print_counts("By kind", &data["by_kind"]);
    print_counts("By operator", &data["by_operator"]);

    println!();
    println!("Top clients:");
    for (rank, entry) in data["top_clients"].as_array().into_iter().flatten().enumerate() {
        println!("  {}. {:<28} {}", rank + 1, str_of(&entry["name"]), entry["count"]);
    }

    println!();
    println!("Per day:");
    for day in data["trend"].as_array().into_iter().flatten() {
        let count = day["count"].as_u64().unwrap_or(0);
        println!(
            "  {}  {:>4} {}",
            str_of(&day["date"]),
            count,
            "#".repeat(count.min(60) as usize)
        );
    }
}

fn print_breakdown(label: &str, breakdown: &Value) {
    let kinds: Vec<String> = breakdown["by_kind"]
        .as_object()
        .into_iter()
        .flatten()
        .map(|(kind, count)| format!("{} {}", kind, count))
        .collect();
    println!("{}: {} ({})", label, breakdown["total"], kinds.join(", "));
}

fn print_counts(label: &str, counts: &Value) {
    println!();
    println!("{}:", label);
    for (key, count) in counts.as_object().into_iter().flatten() {
        println!("  {:<20} {}", key, count);
    }
}

fn print_history(history: &Value) {
    let entries: Vec<&Value> = history.as_array().into_iter().flatten().collect();
    if entries.is_empty() {
        println!("  (never sharpened)");
        return;
    }
    for entry in entries {
        println!(
            "  {}  {:<5} {:<12} {}",
            datetime_of(&entry["performed_at"]),
            str_of(&entry["kind"]),
            str_of(&entry["operator"]),
            str_of(&entry["notes"])
        );
    }
}

fn str_of(value: &Value) -> &str {
    value.as_str().unwrap_or("-")
}

fn datetime_of(value: &Value) -> String {
    value
        .as_str()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn date_of(value: &Value) -> String {
    value
        .as_str()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "never".to_string())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
