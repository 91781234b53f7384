//! Talent Results API Server binary
//!
//! HTTP front end for the event results calculator and the competition
//! analysis dashboard.

use clap::Parser;
use talent_results::api::{run_api_server, server::ApiConfig, server::DEFAULT_BODY_LIMIT};

#[derive(Parser, Debug)]
#[command(name = "talent-server")]
#[command(version)]
#[command(about = "Talent Results Server - HTTP API for event results from Excel uploads")]
#[command(long_about = r#"
Talent Results Server - HTTP API for event results

Upload endpoints (multipart/form-data):
  - POST /api/v1/results/preview - marks [+ master] → totals, ranks, points, ties (JSON)
  - POST /api/v1/results         - marks [+ master] + event_name → <event>_results.xlsx
  - POST /api/v1/top/preview     - file + category → top performers, chart, summary (JSON)
  - POST /api/v1/top             - file + category [+ title] → <title>_<Category>_results.xlsx

Form fields:
  first_points, second_points, third_points  (default 5, 3, 1)
  points_enabled                              (default true)
  category                                    (student, church, section, region)
  count                                       (default 5)

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  talent-server                           # Start on localhost:8080
  talent-server --host 0.0.0.0 --port 3000

  curl -F marks=@marks.xlsx -F master=@roster.xlsx -F event_name="Solo Song" \
    -OJ http://localhost:8080/api/v1/results
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "TALENT_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "TALENT_PORT")]
    port: u16,

    /// Maximum upload size in bytes
    #[arg(long, default_value_t = DEFAULT_BODY_LIMIT, env = "TALENT_BODY_LIMIT")]
    body_limit: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
        body_limit: args.body_limit,
    };

    run_api_server(config).await
}
